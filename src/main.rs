//! evreplay -- system-wide input event record and replay engine.
//!
//! Demo binary: wires the gateway over the stub backends and reports the
//! capability status. Real deployments supply OS adapter implementations of
//! the capability traits instead.

use std::sync::Arc;

use evreplay::hooks::SystemClock;
use evreplay::noop::{NoopInjector, NoopMonitor, OpenGate};
use evreplay::sink::ChannelSink;
use evreplay::{Config, Gateway};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("evreplay v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("failed to load {path}: {err}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let (sink, events) = ChannelSink::unbounded();
    let gateway = Gateway::new(
        Box::new(NoopMonitor::new()),
        Box::new(NoopInjector::new()),
        Arc::new(OpenGate::new()),
        Arc::new(sink),
        Arc::new(SystemClock),
        &config,
    );

    log::info!("accessibility granted: {}", gateway.check_accessibility());

    // Exercise the lifecycle once so the stub wiring is visibly alive.
    if let Err(err) = gateway.start_recording() {
        log::error!("start_recording failed: {err}");
    }
    gateway.stop_recording();
    for event in events.try_iter() {
        log::info!("sink: {}", event.type_name());
    }
}
