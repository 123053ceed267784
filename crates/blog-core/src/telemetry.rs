//! Tracing setup shared by the blog binaries.
//!
//! `RUST_LOG` takes precedence; otherwise everything at `level` and above is
//! logged. Only the first call in a process installs a subscriber.

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, as newline-delimited JSON when `json` is set.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);
    let lines = fmt::layer().with_target(false);

    // Already installed: keep the first subscriber.
    let _ = if json {
        registry.with(lines.json()).try_init()
    } else {
        registry.with(lines).try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_first_subscriber() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!(event = "telemetry.test", "still logging");
    }
}
