use std::env;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for the command-line verbosity flags. `None` leaves
/// the choice to `TRACING_LEVEL`.
pub fn level_override(verbose: u8, quiet: bool) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("warn"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

pub fn init_logger(level: Option<&str>) -> impl Drop {
    let filter = match level {
        Some(level) => level.to_string(),
        None => env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/sumcheck.log".to_string());

    let file_appender = tracing_appender::rolling::never("./", log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!("Tracing is configured for stdout and file logging.");

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_dropping_guard_flushes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("sumcheck.log");
        env::set_var("LOG_FILE_PATH", &log_path);

        let guard = init_logger(Some("info"));
        tracing::error!("User 'ghost' not found");
        drop(guard);

        let contents = fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("User 'ghost' not found"));
    }

    #[test]
    fn test_level_override() {
        assert_eq!(level_override(0, false), None);
        assert_eq!(level_override(1, false), Some("debug"));
        assert_eq!(level_override(5, false), Some("trace"));
        assert_eq!(level_override(0, true), Some("warn"));
    }
}
