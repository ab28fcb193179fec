//! Audio track records and best-track selection.

use serde::{Deserialize, Serialize};

use crate::external::{ProbeFormat, ProbeOutput, ProbeStream};

/// Tracks whose duration is this far (or more) below the longest track are
/// not considered for selection.
pub const DURATION_TOLERANCE_SECS: f64 = 1.0;

/// Canonical description of one probed audio stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub codec: String,
    pub bit_rate: u64,
    pub sample_rate: u32,
    pub channels: u32,
    /// Seconds
    pub duration: f64,
    /// Stream index within the container
    pub index: u32,
    pub format_name: String,
}

impl AudioTrack {
    /// Builds a track from a raw stream entry.
    ///
    /// Missing or zero `bit_rate` and `duration` fall back to the container
    /// duration before the track is ever scored.
    pub fn from_probe(stream: &ProbeStream, format: &ProbeFormat) -> Self {
        let container_duration = format.duration.unwrap_or(0.0);
        let present = |v: Option<f64>| v.filter(|x| *x != 0.0);

        Self {
            codec: stream.codec_name.clone().unwrap_or_default(),
            bit_rate: present(stream.bit_rate).unwrap_or(container_duration) as u64,
            sample_rate: stream.sample_rate.unwrap_or(0.0) as u32,
            channels: stream.channels.unwrap_or(0.0) as u32,
            duration: present(stream.duration).unwrap_or(container_duration),
            index: stream.index.unwrap_or(0.0) as u32,
            format_name: format.format_name.clone().unwrap_or_default(),
        }
    }

    /// Selection score: bit rate weighted by codec preference.
    pub fn value(&self) -> f64 {
        self.bit_rate as f64 * codec_weight(&self.codec)
    }
}

/// Extracts the audio streams of a probe result, in stream order.
pub fn tracks_from_probe(output: &ProbeOutput) -> Vec<AudioTrack> {
    output
        .streams
        .iter()
        .filter(|s| s.is_audio())
        .map(|s| AudioTrack::from_probe(s, &output.format))
        .collect()
}

/// Preference multiplier per codec.
pub fn codec_weight(codec: &str) -> f64 {
    match codec {
        "aac" | "vorbis" => 1.2,
        _ => 1.0,
    }
}

/// Picks the highest-value track among those whose duration is within
/// [`DURATION_TOLERANCE_SECS`] of the longest. Ties keep the earliest track.
pub fn select_best_track(tracks: &[AudioTrack]) -> Option<&AudioTrack> {
    let max_duration = tracks.iter().map(|t| t.duration).fold(f64::MIN, f64::max);

    let mut best: Option<(&AudioTrack, f64)> = None;
    for track in tracks
        .iter()
        .filter(|t| max_duration - t.duration < DURATION_TOLERANCE_SECS)
    {
        let value = track.value();
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((track, value)),
        }
    }
    best.map(|(track, _)| track)
}
