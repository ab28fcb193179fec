// ============================================================================
// auscout-core/src/external/ffmpeg_filters.rs
// ============================================================================
//
// FILTER GATEWAY: Whole-File Volume and Loudness Measurements
//
// Two measurements are taken by running filters over the entire file:
// - volumedetect (ffmpeg): mean and max volume in dB
// - ebur128 (ffprobe over lavfi amovie): integrated loudness and loudness
//   range in LUFS/LU
//
// Measurements are best-effort. A failed or unparsable run yields `None`
// values and a warning, never an error.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use ffmpeg_sidecar::command::FfmpegCommand;
use serde::Serialize;

use super::command::run_with_timeout;
use super::ffprobe_executor::ProberTool;
use crate::config::CoreConfig;

/// Output of the volumedetect filter, in dB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VolumeStats {
    pub mean: Option<f64>,
    pub max: Option<f64>,
}

/// Final EBU R128 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoudnessStats {
    /// Integrated loudness (LUFS)
    pub integrated: Option<f64>,
    /// Loudness range (LU)
    pub range: Option<f64>,
    pub range_low: Option<f64>,
    pub range_high: Option<f64>,
}

/// Trait for the whole-file measurement collaborator.
pub trait MeasurementProvider {
    fn volume(&self, path: &Path, timeout: Duration) -> VolumeStats;
    fn loudness(&self, path: &Path, timeout: Duration) -> LoudnessStats;
}

/// Runs the measurement filters with ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegFilterRunner {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegFilterRunner {
    /// Uses ffmpeg-sidecar's default ffmpeg location and `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self {
            ffmpeg: ffmpeg_sidecar::paths::ffmpeg_path(),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }

    pub fn with_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Configured binaries. The loudness filter needs ffprobe's lavfi input,
    /// so an avprobe path is not used for it.
    pub fn from_config(config: &CoreConfig) -> Self {
        let defaults = Self::new();
        let ffprobe = match (&config.prober_path, config.prober) {
            (Some(path), ProberTool::Ffprobe) => path.clone(),
            _ => defaults.ffprobe,
        };
        Self {
            ffmpeg: config.ffmpeg_path.clone().unwrap_or(defaults.ffmpeg),
            ffprobe,
        }
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    fn volume_command(&self, path: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg);
        cmd.input(path)
            .args(["-af", "volumedetect"])
            .format("null")
            .output("-");
        cmd
    }

    fn loudness_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-of",
            "compact=p=0:nk=1",
            "-show_entries",
            "frame_tags=lavfi.r128.I,lavfi.r128.LRA,lavfi.r128.LRA.low,lavfi.r128.LRA.high",
            "-f",
            "lavfi",
        ])
        .arg(format!("amovie={},ebur128=metadata=1", path.display()));
        cmd
    }
}

impl Default for FfmpegFilterRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementProvider for FfmpegFilterRunner {
    fn volume(&self, path: &Path, timeout: Duration) -> VolumeStats {
        log::info!(
            "Checking volume of {} with ffmpeg and volumedetect filter",
            path.display()
        );
        let mut cmd = self.volume_command(path);
        match run_with_timeout(cmd.as_inner_mut(), timeout) {
            Ok(output) => {
                // volumedetect reports on stderr
                let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
                text.push('\n');
                text.push_str(&String::from_utf8_lossy(&output.stdout));
                let stats = parse_volume_output(&text);
                if stats.mean.is_none() || stats.max.is_none() {
                    log::warn!("Incomplete volumedetect output for {}", path.display());
                }
                stats
            }
            Err(e) => {
                log::warn!("Volume measurement failed for {}: {}", path.display(), e);
                VolumeStats::default()
            }
        }
    }

    fn loudness(&self, path: &Path, timeout: Duration) -> LoudnessStats {
        log::info!(
            "Checking loudness of {} with ffprobe and ebur128 filter",
            path.display()
        );
        let mut cmd = self.loudness_command(path);
        match run_with_timeout(&mut cmd, timeout) {
            Ok(output) => {
                let text = String::from_utf8_lossy(&output.stdout);
                let stats = parse_loudness_output(&text);
                if stats.integrated.is_none() {
                    log::warn!("Unparsable ebur128 output for {}", path.display());
                }
                stats
            }
            Err(e) => {
                log::warn!("Loudness measurement failed for {}: {}", path.display(), e);
                LoudnessStats::default()
            }
        }
    }
}

/// Second-to-last whitespace token of a volumedetect line (`... -20.5 dB`).
fn db_value(line: &str) -> Option<f64> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    tokens[tokens.len() - 2].parse().ok()
}

/// Extracts `mean_volume:` and `max_volume:` from volumedetect output.
/// Each value is parsed on its own, so one can be present without the other.
pub fn parse_volume_output(text: &str) -> VolumeStats {
    let mut stats = VolumeStats::default();
    for line in text.lines() {
        let line = line.trim_end();
        if line.contains("mean_volume:") {
            stats.mean = db_value(line);
        } else if line.contains("max_volume:") {
            stats.max = db_value(line);
        }
    }
    stats
}

/// Reads the final `I|LRA|LRA.low|LRA.high` line of the ebur128 frame tags.
/// Anything other than exactly four floats leaves every value unavailable.
pub fn parse_loudness_output(text: &str) -> LoudnessStats {
    let Some(last) = text.lines().map(str::trim).filter(|l| !l.is_empty()).last() else {
        return LoudnessStats::default();
    };
    log::debug!("Last ebur128 line: {}", last);

    let values: Option<Vec<f64>> = last.split('|').map(|v| v.trim().parse().ok()).collect();
    match values.as_deref() {
        Some(&[integrated, range, range_low, range_high]) => LoudnessStats {
            integrated: Some(integrated),
            range: Some(range),
            range_low: Some(range_low),
            range_high: Some(range_high),
        },
        _ => LoudnessStats::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_skips_avprobe_for_loudness() {
        let config = crate::config::CoreConfigBuilder::new()
            .prober(ProberTool::Avprobe)
            .prober_path("/opt/libav/avprobe")
            .ffmpeg_path("/opt/ffmpeg/ffmpeg")
            .build();
        let runner = FfmpegFilterRunner::from_config(&config);
        assert_eq!(runner.ffmpeg(), Path::new("/opt/ffmpeg/ffmpeg"));
        assert_eq!(runner.ffprobe(), Path::new("ffprobe"));
    }

    #[test]
    fn test_parse_volume_output() {
        let text = "\
[Parsed_volumedetect_0 @ 0x55d1] n_samples: 441000
[Parsed_volumedetect_0 @ 0x55d1] mean_volume: -23.4 dB
[Parsed_volumedetect_0 @ 0x55d1] max_volume: -2.0 dB
[Parsed_volumedetect_0 @ 0x55d1] histogram_2db: 12
";
        let stats = parse_volume_output(text);
        assert_eq!(stats.mean, Some(-23.4));
        assert_eq!(stats.max, Some(-2.0));
    }

    #[test]
    fn test_volume_values_are_independent() {
        let stats = parse_volume_output("mean_volume: -18.1 dB\nmax_volume: garbage dB\n");
        assert_eq!(stats.mean, Some(-18.1));
        assert_eq!(stats.max, None);

        let stats = parse_volume_output("nothing useful");
        assert_eq!(stats, VolumeStats::default());
    }

    #[test]
    fn test_parse_loudness_last_line() {
        let text = "-70.0|0.0|0.0|0.0\n-24.1|6.2|-30.5|-24.3\n\n";
        let stats = parse_loudness_output(text);
        assert_eq!(stats.integrated, Some(-24.1));
        assert_eq!(stats.range, Some(6.2));
        assert_eq!(stats.range_low, Some(-30.5));
        assert_eq!(stats.range_high, Some(-24.3));
    }

    #[test]
    fn test_parse_loudness_requires_four_floats() {
        assert_eq!(parse_loudness_output("-24.1|6.2|-30.5\n"), LoudnessStats::default());
        assert_eq!(parse_loudness_output("-24.1|x|-30.5|1\n"), LoudnessStats::default());
        assert_eq!(parse_loudness_output(""), LoudnessStats::default());
    }

    #[test]
    fn test_volume_command_args() {
        let runner = FfmpegFilterRunner::with_paths("/usr/bin/ffmpeg", "/usr/bin/ffprobe");
        let mut cmd = runner.volume_command(Path::new("/tmp/a.wav"));
        let args: Vec<String> = cmd
            .as_inner_mut()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let joined = args.join(" ");
        assert!(joined.contains("-i /tmp/a.wav"));
        assert!(joined.contains("-af volumedetect"));
        assert!(joined.ends_with("-f null -"));
    }

    #[cfg(unix)]
    #[test]
    fn test_volume_command_keeps_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/tmp/caf\xe9 take.wav");
        let runner = FfmpegFilterRunner::with_paths("ffmpeg", "ffprobe");
        let mut cmd = runner.volume_command(Path::new(raw));
        let args: Vec<&OsStr> = cmd.as_inner_mut().get_args().collect();
        let input = args.iter().position(|a| *a == "-i").map(|i| args[i + 1]);
        assert_eq!(input, Some(raw));
    }

    #[test]
    fn test_loudness_command_args() {
        let runner = FfmpegFilterRunner::with_paths("ffmpeg", "ffprobe");
        let cmd = runner.loudness_command(Path::new("/tmp/a.wav"));
        let last = cmd.get_args().last().map(|a| a.to_string_lossy().into_owned());
        assert_eq!(last.as_deref(), Some("amovie=/tmp/a.wav,ebur128=metadata=1"));
    }
}
