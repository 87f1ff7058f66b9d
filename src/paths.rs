use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::entities::attrs::Attrs;

/// Default options file name
pub const OPTIONS_FILE: &str = "playkit.json";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (PLAYKIT_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var("PLAYKIT_CONFIG_DIR")
                .ok()
                .map(PathBuf::from)
        });

        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. PLAYKIT_CONFIG_DIR environment variable
/// 3. Local folder IF playkit.json exists there
/// 4. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/playkit/{name}
/// - macOS: ~/Library/Application Support/playkit/{name}
/// - Windows: %APPDATA%\playkit\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Read player options from a JSON object file.
///
/// Numbers keep their JSON shape: `15` is an Int, `15.0` a Float.
pub fn load_options(path: &Path) -> Result<Attrs> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    Attrs::from_json(&raw)
        .with_context(|| format!("Failed to parse options file: {}", path.display()))
}

/// Options from an explicit file, else from `playkit.json` in the config
/// directory when present, else empty.
pub fn resolve_options(explicit: Option<&Path>, config: &PathConfig) -> Result<Attrs> {
    if let Some(path) = explicit {
        return load_options(path);
    }
    let default = config_file(OPTIONS_FILE, config);
    if default.exists() {
        log::info!("Loading options from {}", default.display());
        return load_options(&default);
    }
    Ok(Attrs::new())
}

/// Get the configuration directory
fn get_config_dir(config: &PathConfig) -> PathBuf {
    // Priority 1: Custom directory from CLI or ENV
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    // Priority 2: Local folder IF an options file exists there
    if let Ok(current_dir) = std::env::current_dir() {
        if current_dir.join(OPTIONS_FILE).exists() {
            return current_dir;
        }
    }

    // Priority 3: Platform-specific config directory
    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("playkit");
    }

    PathBuf::from(".")
}
