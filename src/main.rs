//! Hygrostat simulator: main entry point.
//!
//! Runs the controller core against a scripted event stream.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  script (stdin)   LogEventSink   FileStore     MonotonicClock  │
//! │  (events)         (EventSink)    (Config+State) (TimePort)     │
//! │  LogActuators                                                  │
//! │  (ActuatorPort)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Engine · Safety · Boost · Dwell                       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `hygrostat-sim [config.json [state-dir]] < script.txt`.  See
//! [`hygrostat::adapters::script`] for the script format.  Config and
//! controller state persist in `state-dir` (default `hygrostat-state`); a
//! config file given on the command line replaces the stored one.  Log
//! verbosity follows `RUST_LOG` (default `info`).
#![deny(unused_must_use)]

use std::io::BufRead;

use anyhow::{Context, Result};
use log::{info, warn};

use hygrostat::adapters::log_sink::{LogActuators, LogEventSink};
use hygrostat::adapters::file_store::FileStore;
use hygrostat::adapters::script;
use hygrostat::adapters::time::MonotonicClock;
use hygrostat::app::persist::PersistedState;
use hygrostat::app::ports::{ConfigPort, TimePort};
use hygrostat::app::service::AppService;
use hygrostat::config::ControllerConfig;
use hygrostat::events::{EventQueue, TickSchedule};

const DEFAULT_STATE_DIR: &str = "hygrostat-state";

fn load_config(store: &FileStore) -> Result<ControllerConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            let config = ControllerConfig::from_json(&text)
                .with_context(|| format!("parsing config {path}"))?;
            store.save(&config).context("storing config")?;
            info!("Config loaded from {}", path);
            Ok(config)
        }
        None => store.load().context("loading stored config"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Hygrostat sim v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration & persisted state ────────────────────
    let state_dir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| DEFAULT_STATE_DIR.to_owned());
    let mut store =
        FileStore::open(&state_dir).with_context(|| format!("opening state dir {state_dir}"))?;
    let config = load_config(&store)?;
    let mut app = AppService::new(config).context("building controller")?;
    if let Some(state) = PersistedState::load(&store) {
        app.restore(&state);
    }

    // ── 2. Adapters ───────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut hw = LogActuators::new();
    let queue = EventQueue::new();

    app.start(clock.now(), &mut hw, &mut sink);
    let mut ticks = TickSchedule::new(clock.now(), app.current_config().tick_interval());
    info!("System ready. Reading events from stdin.");

    // ── 3. Event loop ─────────────────────────────────────────
    let stdin = std::io::stdin();
    let mut last_at = clock.now();
    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let event = match script::parse_line(&line, clock.now()) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!("line {}: {} ({:?})", number + 1, e, line.trim());
                continue;
            }
        };
        last_at = last_at.max(event.at());

        // Fire the periodic ticks a host timer would have fired by now.
        while let Some(at) = ticks.poll(event.at()) {
            app.tick(at, &mut hw, &mut sink);
        }
        if !queue.push(event) {
            warn!("event queue full, dropping line {}", number + 1);
        }

        queue.drain(|event| {
            if let Err(e) = app.dispatch(event, &mut hw, &mut sink) {
                warn!("event rejected: {}", e);
            }
        });
        app.auto_save_if_needed(&mut store, last_at);
    }

    app.force_save_if_dirty(&mut store);
    info!(
        "Script finished after {} decision cycles in {} s (mode {})",
        app.cycle_count(),
        clock.uptime_secs(),
        app.mode()
    );
    Ok(())
}
