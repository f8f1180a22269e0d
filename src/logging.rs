use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "PREPD_LOG";

/// Installs the global subscriber. Output goes to stderr: stdout carries the
/// IPC responses and must stay clean.
///
/// The filter comes from `PREPD_LOG`, then `RUST_LOG`, then `info`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("[prepd] logging already initialized: {e}");
    }
}
