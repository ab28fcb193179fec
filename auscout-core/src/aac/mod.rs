// ============================================================================
// auscout-core/src/aac/mod.rs
// ============================================================================
//
// AAC PROFILE CLASSIFICATION: Cross-Checking Two Independent Probers
//
// The primary prober (ffprobe/avprobe) reports the codec, channel count and
// sample rate of the decoded output. HE-AAC doubles the sample rate through
// SBR and HE-AACv2 upmixes mono to stereo through PS, so the primary values
// describe the decoded stream while mediainfo describes the core stream.
//
// Classification order:
// 1. Non-AAC codec -> non-aac
// 2. mediainfo's `Format_profile` contains HE-AACv2 / HE-AAC / LC
// 3. Channel count differs between the two tools -> aac_he_v2
// 4. Primary sample rate > 1.2 x mediainfo sample rate -> aac_he, else lc

use std::fmt;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::external::SecondaryTrack;
use crate::media::AudioTrack;

/// Field carrying the profile description in the secondary report.
pub const PROFILE_FIELD: &str = "Format_profile";

/// Field carrying the sampling rate in the secondary report.
pub const SAMPLING_RATE_FIELD: &str = "Sampling_rate";

/// Primary sample rate must exceed the secondary one by this factor for HE-AAC.
const SBR_RATE_FACTOR: f64 = 1.2;

/// AAC sub-profile of one audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AacProfile {
    #[serde(rename = "non-aac")]
    NonAac,
    #[serde(rename = "lc")]
    Lc,
    #[serde(rename = "aac_he")]
    AacHe,
    #[serde(rename = "aac_he_v2")]
    AacHeV2,
}

impl AacProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            AacProfile::NonAac => "non-aac",
            AacProfile::Lc => "lc",
            AacProfile::AacHe => "aac_he",
            AacProfile::AacHeV2 => "aac_he_v2",
        }
    }
}

impl fmt::Display for AacProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the channel-count field, which differs between mediainfo versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCountField {
    /// Older releases: `Channel(s)`
    ChannelS,
    /// Newer releases: `Channel count`
    ChannelCount,
}

impl ChannelCountField {
    pub fn key(self) -> &'static str {
        match self {
            ChannelCountField::ChannelS => "Channel_s_",
            ChannelCountField::ChannelCount => "Channel_count",
        }
    }

    /// First variant present in `fields`, in the order above.
    pub fn detect(fields: &SecondaryTrack) -> Option<Self> {
        [ChannelCountField::ChannelS, ChannelCountField::ChannelCount]
            .into_iter()
            .find(|f| fields.contains_key(f.key()))
    }
}

fn unparsable(field: &str, value: &str) -> CoreError {
    CoreError::SecondaryFieldUnparsable {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Reads the leading integer of a channel-count value (`"2 channels"` -> 2).
pub fn parse_channel_count(field: &str, value: &str) -> CoreResult<u32> {
    value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| unparsable(field, value))
}

/// Reads a sampling-rate value in Hz.
///
/// Only the first ` / `-separated entry counts. A `kHz` suffix (any case)
/// scales by 1000; digit groups split by spaces (`48 000 Hz`) are joined.
pub fn parse_sampling_rate(field: &str, value: &str) -> CoreResult<f64> {
    let first = value.split(" / ").next().unwrap_or("").trim();
    let lower = first.to_ascii_lowercase();

    let (number, scale) = if let Some(n) = lower.strip_suffix("khz") {
        (n, 1000.0)
    } else if let Some(n) = lower.strip_suffix("hz") {
        (n, 1.0)
    } else {
        (lower.as_str(), 1.0)
    };

    let digits: String = number.split_whitespace().collect();
    digits
        .parse::<f64>()
        .map(|n| n * scale)
        .map_err(|_| unparsable(field, value))
}

/// Classifies `track` given the secondary prober's fields for the same track.
pub fn classify_aac_profile(track: &AudioTrack, fields: &SecondaryTrack) -> CoreResult<AacProfile> {
    if track.codec != "aac" {
        return Ok(AacProfile::NonAac);
    }

    if let Some(profile) = fields.get(PROFILE_FIELD) {
        if profile.contains("HE-AACv2") {
            return Ok(AacProfile::AacHeV2);
        } else if profile.contains("HE-AAC") {
            return Ok(AacProfile::AacHe);
        } else if profile.contains("LC") {
            return Ok(AacProfile::Lc);
        }
    }
    log::warn!("Secondary profile field is not usable, comparing probers instead");

    let channel_field = ChannelCountField::detect(fields).ok_or_else(|| {
        CoreError::UnsupportedSecondaryToolVersion(
            "neither Channel_s_ nor Channel_count is reported".to_string(),
        )
    })?;
    let key = channel_field.key();
    let secondary_channels = parse_channel_count(key, &fields[key])?;
    if secondary_channels != track.channels {
        log::debug!(
            "Channel count mismatch: primary {} vs secondary {}",
            track.channels,
            secondary_channels
        );
        return Ok(AacProfile::AacHeV2);
    }

    let raw_rate = fields
        .get(SAMPLING_RATE_FIELD)
        .ok_or_else(|| unparsable(SAMPLING_RATE_FIELD, ""))?;
    let secondary_rate = parse_sampling_rate(SAMPLING_RATE_FIELD, raw_rate)?;
    if f64::from(track.sample_rate) > SBR_RATE_FACTOR * secondary_rate {
        Ok(AacProfile::AacHe)
    } else {
        Ok(AacProfile::Lc)
    }
}
