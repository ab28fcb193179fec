// ============================================================================
// auscout-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent API for creating CoreConfig instances. Every field starts at its
// default, so callers only set what they want to override.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::external::ProberTool;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use auscout_core::config::CoreConfigBuilder;
/// use auscout_core::external::ProberTool;
///
/// let config = CoreConfigBuilder::new()
///     .prober(ProberTool::Avprobe)
///     .race_repeat(3)
///     .loud_bound(256)
///     .build();
/// assert_eq!(config.race_repeat, 3);
/// assert_eq!(config.analyzer.loud_bound, 256);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary prober tool.
    pub fn prober(mut self, prober: ProberTool) -> Self {
        self.config.prober = prober;
        self
    }

    /// Sets an explicit path for the primary prober binary.
    pub fn prober_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.prober_path = Some(path.into());
        self
    }

    /// Sets an explicit path for the mediainfo binary.
    pub fn mediainfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mediainfo_path = Some(path.into());
        self
    }

    /// Sets an explicit path for the ffmpeg binary.
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = Some(path.into());
        self
    }

    /// Sets the number of attempts per track probe.
    pub fn probe_retries(mut self, retries: u32) -> Self {
        self.config.probe_retries = retries;
        self
    }

    /// Sets the timeout per primary probe invocation.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Sets the number of timed attempts per racing candidate.
    pub fn race_repeat(mut self, repeat: u32) -> Self {
        self.config.race_repeat = repeat;
        self
    }

    /// Sets the timeout per racing attempt.
    pub fn race_timeout(mut self, timeout: Duration) -> Self {
        self.config.race_timeout = timeout;
        self
    }

    /// Sets the timeout for volume/loudness filters.
    pub fn filter_timeout(mut self, timeout: Duration) -> Self {
        self.config.filter_timeout = timeout;
        self
    }

    /// Sets the number of PCM frames the analyzer scans (0 = whole file).
    pub fn tested_frames(mut self, frames: u64) -> Self {
        self.config.analyzer.frame_count = frames;
        self
    }

    /// Sets the loudness bound for valid frames.
    pub fn loud_bound(mut self, bound: u32) -> Self {
        self.config.analyzer.loud_bound = bound;
        self
    }

    /// Sets the mirror tolerance for inverted frames.
    pub fn invert_bound(mut self, bound: u32) -> Self {
        self.config.analyzer.invert_bound = bound;
        self
    }

    /// Sets the number of leading frames skipped before analysis.
    pub fn skip_frames(mut self, frames: u64) -> Self {
        self.config.analyzer.skip_frames = frames;
        self
    }

    /// Builds the CoreConfig.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
