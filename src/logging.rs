//! Diagnostic logging setup.
//!
//! Library code logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on stderr, which also receives `log`
//! records.

use tracing_subscriber::filter::LevelFilter;

/// Maps `-v` occurrences and `--quiet` to a maximum log level.
///
/// `--quiet` wins and keeps only errors; otherwise the level starts at
/// `warn` and each `-v` raises it one step, saturating at `trace`.
#[must_use]
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the stderr subscriber.
///
/// # Errors
///
/// Returns an error when a global subscriber or logger is already installed;
/// the existing one stays active.
pub fn init_logging(
    verbosity: u8,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(level_filter(verbosity, quiet))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
}
