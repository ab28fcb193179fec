//! Primary probe gateway: ffprobe/avprobe invocation and JSON decoding.
//!
//! The probe is run as
//! `<tool> [input options...] <locator> -show_entries format:stream -print_format json`
//! and its output is decoded into [`ProbeOutput`]. Every field is optional
//! because stream URLs, containers and tool versions disagree on what they
//! report; numeric fields are accepted as JSON numbers or numeric strings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::command::run_with_timeout;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

/// Tool used as the primary prober. ffprobe and avprobe share an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProberTool {
    #[default]
    Ffprobe,
    Avprobe,
}

impl ProberTool {
    /// Binary name looked up on `PATH` when no explicit path is configured.
    pub fn binary_name(self) -> &'static str {
        match self {
            ProberTool::Ffprobe => "ffprobe",
            ProberTool::Avprobe => "avprobe",
        }
    }
}

impl fmt::Display for ProberTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

impl FromStr for ProberTool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ffprobe" => Ok(ProberTool::Ffprobe),
            "avprobe" => Ok(ProberTool::Avprobe),
            other => Err(CoreError::Config(format!(
                "unknown prober '{other}' (expected ffprobe or avprobe)"
            ))),
        }
    }
}

/// Decoded `-show_entries format:stream` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: ProbeFormat,
}

/// One entry of the `streams` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bit_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sample_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub channels: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub index: Option<f64>,
}

impl ProbeStream {
    pub fn is_audio(&self) -> bool {
        self.codec_type.as_deref() == Some("audio")
    }
}

/// The container-level `format` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub format_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration: Option<f64>,
}

/// Accepts `123`, `123.4`, `"123"`, `null`; anything else (`"N/A"`) is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Decodes raw prober stdout. Empty output is an invalid source.
pub fn parse_probe_output(stdout: &[u8], locator: &str) -> CoreResult<ProbeOutput> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Err(CoreError::ProbeOutput(format!("Invalid source {locator}")));
    }
    serde_json::from_str(&text).map_err(|e| CoreError::JsonParseError(e.to_string()))
}

/// Trait for running the primary prober.
///
/// Implemented by [`FfprobeExecutor`] for real binaries and by test fakes.
pub trait PrimaryProber {
    /// Probes `locator` once, bounded by `timeout`.
    fn probe(
        &self,
        locator: &str,
        input_options: &[String],
        timeout: Duration,
    ) -> CoreResult<ProbeOutput>;
}

impl<T: PrimaryProber + ?Sized> PrimaryProber for &T {
    fn probe(
        &self,
        locator: &str,
        input_options: &[String],
        timeout: Duration,
    ) -> CoreResult<ProbeOutput> {
        (**self).probe(locator, input_options, timeout)
    }
}

/// Runs ffprobe or avprobe as a child process.
#[derive(Debug, Clone)]
pub struct FfprobeExecutor {
    tool: ProberTool,
    binary: PathBuf,
}

impl FfprobeExecutor {
    /// Uses the tool's binary name from `PATH`.
    pub fn new(tool: ProberTool) -> Self {
        Self {
            tool,
            binary: PathBuf::from(tool.binary_name()),
        }
    }

    /// Uses an explicit binary location.
    pub fn with_path(tool: ProberTool, binary: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            binary: binary.into(),
        }
    }

    /// Uses the configured tool, at `config.prober_path` when set.
    pub fn from_config(config: &CoreConfig) -> Self {
        match &config.prober_path {
            Some(path) => Self::with_path(config.prober, path),
            None => Self::new(config.prober),
        }
    }

    pub fn tool(&self) -> ProberTool {
        self.tool
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Builds the probe command line without running it.
    pub fn build_command(&self, locator: &str, input_options: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(input_options)
            .arg(locator)
            .args(["-show_entries", "format:stream", "-print_format", "json"]);
        cmd
    }
}

impl Default for FfprobeExecutor {
    fn default() -> Self {
        Self::new(ProberTool::Ffprobe)
    }
}

impl PrimaryProber for FfprobeExecutor {
    fn probe(
        &self,
        locator: &str,
        input_options: &[String],
        timeout: Duration,
    ) -> CoreResult<ProbeOutput> {
        log::debug!("Running {} on: {}", self.tool, locator);
        let mut cmd = self.build_command(locator, input_options);
        let output = run_with_timeout(&mut cmd, timeout)?;
        parse_probe_output(&output.stdout, locator)
    }
}
