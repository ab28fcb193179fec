//! Configuration structures and constants for the auscout-core library.
//!
//! This module holds the tool locations and the numeric policies (retry
//! bounds, timeouts, analysis thresholds) used by the probing, racing and
//! analysis code.

mod builder;

use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::AnalyzerSettings;
use crate::error::{CoreError, CoreResult};
use crate::external::ProberTool;

pub use builder::CoreConfigBuilder;

// Default constants

/// Number of attempts a single track probe makes before giving up.
pub const DEFAULT_PROBE_RETRIES: u32 = 5;

/// Timeout for a single primary probe invocation.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of timed attempts per candidate protocol.
pub const DEFAULT_RACE_REPEAT: u32 = 5;

/// Timeout for a single protocol racing attempt.
pub const DEFAULT_RACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the volume and loudness filters.
/// Whole-file filters are slow, so this is much longer than a probe.
pub const DEFAULT_FILTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Score given to a failed racing attempt, in seconds.
pub const FAILED_ATTEMPT_PENALTY_SECS: f64 = 100.0;

/// Number of PCM frames scanned by the channel analyzer.
pub const DEFAULT_TESTED_FRAMES: u64 = 500 << 10;

/// Magnitude a channel must exceed for a frame to count as valid.
pub const DEFAULT_LOUD_BOUND: u32 = 512;

/// Maximum deviation from a perfect mirror for an inverted frame.
pub const DEFAULT_INVERT_BOUND: u32 = 1024;

/// Leading frames skipped before the scan (encoder warm-up).
pub const DEFAULT_SKIP_FRAMES: u64 = 100_000;

/// Main configuration structure for the auscout-core library.
///
/// Created by the consumer of the library (e.g., auscout-cli), usually
/// through [`CoreConfigBuilder`]. Tool paths left as `None` fall back to the
/// binary name on `PATH`.
///
/// # Examples
///
/// ```rust
/// use auscout_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .probe_retries(3)
///     .race_timeout(Duration::from_secs(8))
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Primary prober (ffprobe or avprobe)
    pub prober: ProberTool,

    /// Explicit path to the primary prober binary
    pub prober_path: Option<PathBuf>,

    /// Explicit path to the mediainfo binary
    pub mediainfo_path: Option<PathBuf>,

    /// Explicit path to the ffmpeg binary
    pub ffmpeg_path: Option<PathBuf>,

    /// Attempts per track probe
    pub probe_retries: u32,

    /// Timeout per primary probe invocation
    pub probe_timeout: Duration,

    /// Timed attempts per racing candidate
    pub race_repeat: u32,

    /// Timeout per racing attempt
    pub race_timeout: Duration,

    /// Timeout for volume/loudness filters
    pub filter_timeout: Duration,

    /// Channel analyzer thresholds
    pub analyzer: AnalyzerSettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            prober: ProberTool::Ffprobe,
            prober_path: None,
            mediainfo_path: None,
            ffmpeg_path: None,
            probe_retries: DEFAULT_PROBE_RETRIES,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            race_repeat: DEFAULT_RACE_REPEAT,
            race_timeout: DEFAULT_RACE_TIMEOUT,
            filter_timeout: DEFAULT_FILTER_TIMEOUT,
            analyzer: AnalyzerSettings::default(),
        }
    }
}

impl CoreConfig {
    /// Checks that the numeric policies are usable.
    pub fn validate(&self) -> CoreResult<()> {
        if self.probe_retries == 0 {
            return Err(CoreError::Config(
                "probe_retries must be at least 1".to_string(),
            ));
        }
        if self.race_repeat == 0 {
            return Err(CoreError::Config(
                "race_repeat must be at least 1".to_string(),
            ));
        }
        for (name, timeout) in [
            ("probe_timeout", self.probe_timeout),
            ("race_timeout", self.race_timeout),
            ("filter_timeout", self.filter_timeout),
        ] {
            if timeout.is_zero() {
                return Err(CoreError::Config(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = CoreConfig {
            probe_retries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CoreConfig {
            race_timeout: Duration::ZERO,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("race_timeout"));
    }
}
