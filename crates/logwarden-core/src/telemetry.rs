//! Tracing setup for the Logwarden daemon.
//!
//! Call [`init_tracing`] once at startup. Later calls are ignored because
//! the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown at the requested level by default.
const LOGWARDEN_TARGETS: &[&str] = &["logwarden_core", "logwarden_clients", "logwardend"];

/// Default filter: `level` for our crates, `warn` for dependencies
/// (hyper, reqwest and rustls are noisy at info).
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(LOGWARDEN_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise our crates log at `level`. With
/// `json`, each event is one JSON object per line.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let text_layer = (!json).then(|| fmt::layer().with_target(false));
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
