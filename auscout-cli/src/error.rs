// ============================================================================
// auscout-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reports every failure through auscout-core's CoreError so main.rs
// has a single error type to print. This module adds context helpers for
// errors that originate in the CLI itself (file access, log setup).

// ---- Internal crate imports ----
use auscout_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", f(), e)))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_context_prefixes_message() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = result.cli_with_context(|| "Cannot read 'a.wav'").unwrap_err();
        assert_eq!(err.to_string(), "Cannot read 'a.wav': no such file");
    }

    #[test]
    fn test_option_context() {
        let err = None::<u32>.cli_with_context(|| "nothing here").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(ref m) if m == "nothing here"));
    }
}
