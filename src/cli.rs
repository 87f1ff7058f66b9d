use clap::Parser;
use std::path::PathBuf;

/// Scripted player session against an in-memory media pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source URL (checked with can_play; decides nothing else)
    #[arg(value_name = "URL")]
    pub source: Option<String>,

    /// Simulate a live stream instead of an on-demand asset
    #[arg(short = 'L', long = "live")]
    pub live: bool,

    /// Live: seekable window size in seconds. VOD: asset duration
    #[arg(short = 'w', long = "window", value_name = "SECONDS", default_value_t = 120.0)]
    pub window: f64,

    /// Minimum window size for DVR (overrides the options file)
    #[arg(long = "min-dvr-size", value_name = "SECONDS")]
    pub min_dvr_size: Option<f64>,

    /// Start position in seconds (queued until the pipeline is ready)
    #[arg(long = "start-at", value_name = "SECONDS")]
    pub start_at: Option<f64>,

    /// Seek targets to issue after the pipeline is ready (repeatable)
    #[arg(short = 's', long = "seek", value_name = "SECONDS")]
    pub seeks: Vec<f64>,

    /// Let the host app present fullscreen instead of the player
    #[arg(long = "fullscreen-by-app")]
    pub fullscreen_by_app: bool,

    /// Toggle fullscreen during the session
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Load options from JSON file (default: playkit.json in config dir)
    #[arg(short = 'o', long = "options", value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Print emitted events as JSON lines on stdout
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
