use colored::Colorize;
use log::debug;
use std::time::Instant;

/// Log the time since `start` under `name` and return a fresh start instant.
pub(crate) fn log_duration(name: &str, start: Instant) -> Instant {
    if log::log_enabled!(log::Level::Debug) {
        debug!(
            "{}",
            format!("{name:>12}: {:>13.2?}s", start.elapsed().as_secs_f32()).bold()
        );
    }
    Instant::now()
}
