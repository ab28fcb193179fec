// ============================================================================
// auscout-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates the external command-line tools auscout depends on:
// ffprobe/avprobe (primary probe), mediainfo (secondary probe) and ffmpeg
// (volume/loudness filters). Each one sits behind a trait so the track,
// protocol, AAC and analysis code can be exercised with fakes.
//
// KEY COMPONENTS:
// - PrimaryProber / FfprobeExecutor
// - SecondaryProber / MediaInfoExecutor
// - MeasurementProvider / FfmpegFilterRunner
// - run_with_timeout: the single place child processes are spawned
// - Dependency checking

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Child process execution with timeouts
pub mod command;

/// Volume and loudness measurement filters
pub mod ffmpeg_filters;

/// Primary prober (ffprobe/avprobe) invocation and output decoding
pub mod ffprobe_executor;

/// Secondary prober (mediainfo) invocation and report parsing
pub mod mediainfo_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::run_with_timeout;
pub use ffmpeg_filters::{
    FfmpegFilterRunner, LoudnessStats, MeasurementProvider, VolumeStats,
};
pub use ffprobe_executor::{
    FfprobeExecutor, PrimaryProber, ProbeFormat, ProbeOutput, ProbeStream, ProberTool,
};
pub use mediainfo_executor::{MediaInfoExecutor, SecondaryProber, SecondaryTrack};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd> -version` and only looks at whether the process could be
/// started; the exit status is ignored because some builds exit non-zero for
/// `-version`. mediainfo takes `--version`, which callers pass via
/// [`check_dependency_with_arg`].
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd: impl AsRef<Path>) -> CoreResult<()> {
    check_dependency_with_arg(cmd, "-version")
}

/// Like [`check_dependency`] with a custom version argument.
pub fn check_dependency_with_arg(cmd: impl AsRef<Path>, version_arg: &str) -> CoreResult<()> {
    let cmd = cmd.as_ref();
    let name = cmd.display().to_string();

    let result = Command::new(cmd)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", name);
            Err(CoreError::DependencyNotFound(name))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", name, e);
            Err(CoreError::CommandStart(name, e))
        }
    }
}
