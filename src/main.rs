use playkit::cli::Args;
use playkit::core::event_bus::{Callback, EventObject};
use playkit::core::events::{Event, InternalEvent};
use playkit::core::fullscreen::Presenter;
use playkit::core::pipeline::PlayerStatus;
use playkit::core::player::Player;
use playkit::core::simulator::SimulatedPipeline;
use playkit::entities::attrs::Attrs;
use playkit::entities::keys::{K_FULLSCREEN_BY_APP, K_MIN_DVR_SIZE, K_SOURCE_URL, K_START_AT};
use playkit::paths;

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::sync::Arc;

/// Presentation surface that only logs (no real view hierarchy here)
struct LogPresenter;

impl Presenter for LogPresenter {
    fn present_fullscreen(&mut self) {
        info!("Presenter: content moved to fullscreen surface");
    }

    fn restore_to_parent(&mut self) {
        info!("Presenter: content restored to parent");
    }
}

/// Print every event triggered on `events` to stdout.
fn print_events(events: &EventObject, json: bool) {
    let names = Event::ALL
        .iter()
        .map(|e| e.as_str())
        .chain(InternalEvent::ALL.iter().map(|e| e.as_str()));

    for name in names {
        events.on(name, Callback::new(move |info| {
            if json {
                println!("{}", serde_json::json!({ "event": name, "info": info }));
            } else {
                let payload = serde_json::to_string(info).unwrap_or_default();
                println!("{:<30} {}", name, payload);
            }
        }));
    }
}

/// Merge CLI overrides on top of file options.
fn build_options(args: &Args, mut options: Attrs) -> Attrs {
    if let Some(source) = &args.source {
        options.set(K_SOURCE_URL, source.as_str());
    }
    if let Some(size) = args.min_dvr_size {
        options.set(K_MIN_DVR_SIZE, size);
    }
    if let Some(start) = args.start_at {
        options.set(K_START_AT, start);
    }
    if args.fullscreen_by_app {
        options.set(K_FULLSCREEN_BY_APP, true);
    }
    options
}

/// Drive one session: load, become ready, tick, seek, pause, fullscreen.
fn run_session(args: &Args, player: &Player) {
    let sim = Arc::new(if args.live {
        SimulatedPipeline::live(0.0, args.window)
    } else {
        SimulatedPipeline::vod(args.window)
    });
    let playback = player.playback();

    player.load(sim.clone());
    playback.handle_status_change();
    player.play();

    sim.set_status(PlayerStatus::ReadyToPlay);
    playback.handle_status_change();

    for _ in 0..3 {
        sim.advance(1.0);
        playback.handle_time_update();
    }

    for &target in &args.seeks {
        player.seek(target);
        playback.handle_time_update();
    }

    player.pause();
    if args.live {
        player.play();
        player.seek_to_live_position();
        playback.handle_time_update();
    }

    if args.fullscreen {
        player.set_presenter(Some(Box::new(LogPresenter)));
        if args.fullscreen_by_app {
            // Host app answers the request by presenting, then reports back
            player.enter_fullscreen();
            player.set_fullscreen(true);
            player.exit_fullscreen();
            player.set_fullscreen(false);
        } else {
            player.enter_fullscreen();
            player.exit_fullscreen();
        }
    }

    info!(
        "Session done: position {:.2}s of {:.2}s, {} pipeline seek(s)",
        player.position(),
        player.duration(),
        sim.seek_calls().len()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Console logging with specified verbosity level (respects RUST_LOG if set)
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    info!("playkit v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let path_config = paths::PathConfig::from_env_and_cli(args.config_dir.clone());
    info!(
        "Config path: {}",
        paths::config_file(paths::OPTIONS_FILE, &path_config).display()
    );

    let options = build_options(&args, paths::resolve_options(args.options.as_deref(), &path_config)?);
    if options.contains(K_SOURCE_URL) && !Player::can_play(&options) {
        warn!("Source is not playable, continuing with the simulated pipeline anyway");
    }

    let player = Player::new(options);
    print_events(player.events(), args.json);

    run_session(&args, &player);
    player.destroy();
    Ok(())
}
