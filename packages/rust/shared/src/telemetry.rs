//! Tracing subscriber setup for callers embedding the pipeline.

use tracing_subscriber::{EnvFilter, fmt};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Default filter directive for a verbosity level (0 = info, 1 = debug, 2+ = trace).
///
/// HTTP client internals stay at `warn` regardless.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn,html5ever=warn")
}

/// Install a global fmt subscriber. `RUST_LOG` overrides the verbosity default.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(verbosity: u8, format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    match format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init()
            .is_ok(),
        LogFormat::Json => fmt().json().with_env_filter(env_filter).try_init().is_ok(),
    }
}
