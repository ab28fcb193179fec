// ============================================================================
// auscout-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for auscout-core
//
// A single error enum covers failures of the external tools (ffprobe,
// mediainfo, ffmpeg), the fatal outcomes of protocol racing and AAC
// classification, and PCM layout problems.
//
// Expected probe failures never surface as errors from the track catalog:
// they are retried and collapse into an empty track list. Only the cases
// listed here as fatal reach the caller.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by auscout-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{0}' failed with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Command '{0}' timed out after {1:?}")]
    CommandTimeout(String, Duration),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid probe output: {0}")]
    ProbeOutput(String),

    #[error("Unsupported protocol scheme '{0}'")]
    UnsupportedProtocolScheme(String),

    #[error("No available protocol for {0}")]
    NoAvailableProtocol(String),

    #[error("Operation requires a local file: {0}")]
    LocalFileRequired(String),

    #[error("No audio track at index {index} ({available} available)")]
    TrackNotFound { index: usize, available: usize },

    #[error("Unsupported secondary probe tool version: {0}")]
    UnsupportedSecondaryToolVersion(String),

    #[error("Secondary probe field '{field}' has unparsable value '{value}'")]
    SecondaryFieldUnparsable { field: String, value: String },

    #[error("Unsupported PCM sample width: {0} bytes")]
    UnsupportedSampleWidth(u16),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for auscout-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds the error for a command that could not be waited on.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds the error for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
