// ============================================================================
// auscout-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or File Logging for the CLI
//
// By default the CLI logs to stderr through `env_logger` (RUST_LOG is
// respected; the default level is info, or debug with --verbose). With
// --log-dir the core's log4rs file appender is used instead, writing to
// `auscout_<command>_<timestamp>.log` in that directory.

use crate::error::{CliErrorContext, CliResult};
use auscout_core::file_logging::{log_file_path, setup_file_logging};
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let stamp = auscout_cli::logging::get_timestamp();
/// assert_eq!(stamp.len(), 15);
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes logging for one run. Returns the log file when logging to a file.
pub fn init_logging(
    verbose: bool,
    log_dir: Option<&Path>,
    command: &str,
) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    match log_dir {
        Some(dir) => {
            let path = log_file_path(dir, command, &get_timestamp());
            setup_file_logging(&path, level)
                .map_err(|e| format!("{e:#}"))
                .cli_with_context(|| format!("Failed to set up logging in '{}'", dir.display()))?;
            Ok(Some(path))
        }
        None => {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(level.as_str()),
            )
            .format_timestamp(None)
            .init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let stamp = get_timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_verbose_level() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
