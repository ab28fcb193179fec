//! Secondary probe gateway: mediainfo text reports.
//!
//! mediainfo's default report is a list of sections (`General`, `Audio #1`,
//! ...) made of `Label : value` lines. Each `Audio` section becomes one field
//! map, keyed by the label with every non-alphanumeric character replaced by
//! `_` (`Channel(s)` -> `Channel_s_`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::command::run_with_timeout;
use crate::config::CoreConfig;
use crate::error::CoreResult;

/// Field map of one audio track as reported by the secondary prober.
pub type SecondaryTrack = HashMap<String, String>;

/// Trait for running the secondary (independent) prober.
pub trait SecondaryProber {
    /// Returns one field map per audio track, in stream order.
    fn audio_tracks(&self, path: &Path, timeout: Duration) -> CoreResult<Vec<SecondaryTrack>>;
}

impl<T: SecondaryProber + ?Sized> SecondaryProber for &T {
    fn audio_tracks(&self, path: &Path, timeout: Duration) -> CoreResult<Vec<SecondaryTrack>> {
        (**self).audio_tracks(path, timeout)
    }
}

/// Runs the `mediainfo` binary.
#[derive(Debug, Clone)]
pub struct MediaInfoExecutor {
    binary: PathBuf,
}

impl MediaInfoExecutor {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("mediainfo"),
        }
    }

    pub fn with_path(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        match &config.mediainfo_path {
            Some(path) => Self::with_path(path),
            None => Self::new(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for MediaInfoExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SecondaryProber for MediaInfoExecutor {
    fn audio_tracks(&self, path: &Path, timeout: Duration) -> CoreResult<Vec<SecondaryTrack>> {
        log::debug!("Running mediainfo on: {}", path.display());
        let mut cmd = Command::new(&self.binary);
        cmd.arg(path);
        let output = run_with_timeout(&mut cmd, timeout)?;
        let report = String::from_utf8_lossy(&output.stdout);
        Ok(parse_audio_sections(&report))
    }
}

/// Replaces every non-alphanumeric character of a report label with `_`.
pub fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Splits a mediainfo text report into per-audio-track field maps.
///
/// The first occurrence of a label within a section wins.
pub fn parse_audio_sections(report: &str) -> Vec<SecondaryTrack> {
    let mut tracks = Vec::new();
    let mut current: Option<SecondaryTrack> = None;

    for line in report.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(" : ") {
            Some((label, value)) => {
                if let Some(fields) = current.as_mut() {
                    fields
                        .entry(sanitize_label(label))
                        .or_insert_with(|| value.trim().to_string());
                }
            }
            None => {
                // Section header
                if let Some(done) = current.take() {
                    tracks.push(done);
                }
                if line.trim_start().starts_with("Audio") {
                    current = Some(HashMap::new());
                }
            }
        }
    }
    if let Some(done) = current {
        tracks.push(done);
    }
    tracks
}
