//! Channel integrity analysis over decoded stereo PCM.
//!
//! Each scanned frame is classified as valid (loud enough, not clipped),
//! inverted (the right channel mirrors the left) and one-sided (one channel
//! more than four times louder). The counts are turned into the final
//! diagnosis once the scan ends.

use std::fmt;
use std::io::{self, Read};

use serde::Serialize;

use super::pcm::PcmLayout;
use crate::config::{
    DEFAULT_INVERT_BOUND, DEFAULT_LOUD_BOUND, DEFAULT_SKIP_FRAMES, DEFAULT_TESTED_FRAMES,
};
use crate::error::CoreResult;
use crate::external::{LoudnessStats, VolumeStats};

/// Inverted frames must make up at least 1/1.6 (62.5%) of valid frames.
const INVERTED_RATIO: f64 = 1.6;

/// Thresholds of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Frames to scan after the skip window; 0 scans to the end
    pub frame_count: u64,
    /// A frame is valid when a channel magnitude exceeds this
    pub loud_bound: u32,
    /// Largest distance from a perfect mirror still counted as inverted
    pub invert_bound: u32,
    /// Leading frames ignored before the scan
    pub skip_frames: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_TESTED_FRAMES,
            loud_bound: DEFAULT_LOUD_BOUND,
            invert_bound: DEFAULT_INVERT_BOUND,
            skip_frames: DEFAULT_SKIP_FRAMES,
        }
    }
}

/// Whole-file volume and loudness values. `None` means unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Measurements {
    pub volume_mean: Option<f64>,
    pub volume_max: Option<f64>,
    pub loudness_integrated: Option<f64>,
    pub loudness_range: Option<f64>,
    pub loudness_range_low: Option<f64>,
    pub loudness_range_high: Option<f64>,
}

impl Measurements {
    pub fn from_stats(volume: VolumeStats, loudness: LoudnessStats) -> Self {
        Self {
            volume_mean: volume.mean,
            volume_max: volume.max,
            loudness_integrated: loudness.integrated,
            loudness_range: loudness.range,
            loudness_range_low: loudness.range_low,
            loudness_range_high: loudness.range_high,
        }
    }
}

/// Frame tallies of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameCounts {
    pub tested: u64,
    pub valid: u64,
    pub inverted: u64,
    pub ll: u64,
    pub rr: u64,
}

/// Which channel dominates a one-sided frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Classification of a single stereo frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    /// Too quiet, or one channel at full scale
    Ignored,
    Valid { inverted: bool, side: Option<Side> },
}

/// Classifies one frame from its raw left and right words.
pub fn classify_frame(
    layout: &PcmLayout,
    left: u64,
    right: u64,
    loud_bound: u32,
    invert_bound: u32,
) -> FrameClass {
    let left_abs = layout.fold_left(left);
    let right_abs = layout.fold_right(right);
    let loud = u64::from(loud_bound);

    if left_abs <= loud && right_abs <= loud {
        return FrameClass::Ignored;
    }
    let max = layout.half_range();
    if left_abs == max || right_abs == max {
        return FrameClass::Ignored;
    }

    let opposite = layout.is_negative(left) != layout.is_negative(right);
    let inverted = opposite && (2 * max).abs_diff(left + right) <= u64::from(invert_bound);

    let side = if left_abs > 4 * right_abs {
        Some(Side::Left)
    } else if right_abs > 4 * left_abs {
        Some(Side::Right)
    } else {
        None
    };

    FrameClass::Valid { inverted, side }
}

/// Result of a channel integrity analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDiagnosis {
    pub n_channels: u16,
    /// False when the channel scan was skipped (not stereo, too short)
    pub channels_checked: bool,
    pub n_tested_frames: u64,
    pub n_valid_frames: u64,
    pub n_inverted_frames: u64,
    pub n_ll_frames: u64,
    pub n_rr_frames: u64,
    pub is_inverted: bool,
    pub is_ll: bool,
    pub is_rr: bool,
    pub is_always_low: bool,
    #[serde(flatten)]
    pub measurements: Measurements,
}

impl StreamDiagnosis {
    /// Derives the diagnoses from the frame tallies.
    pub fn from_counts(n_channels: u16, counts: FrameCounts) -> Self {
        let stereo = n_channels == 2;
        let enough_valid = stereo && counts.valid * 8 > counts.tested;

        let is_ll = enough_valid
            && counts.ll > 0
            && counts.ll >= counts.valid / 4
            && counts.ll >= counts.rr * 4;
        let is_rr = enough_valid
            && counts.rr > 0
            && counts.rr >= counts.valid / 4
            && counts.rr >= counts.ll * 4;
        let is_inverted = enough_valid
            && counts.inverted > 0
            && !is_ll
            && !is_rr
            && counts.inverted as f64 * INVERTED_RATIO >= counts.valid as f64;
        let is_always_low = stereo && counts.valid <= counts.tested / 1024;

        Self {
            n_channels,
            channels_checked: true,
            n_tested_frames: counts.tested,
            n_valid_frames: counts.valid,
            n_inverted_frames: counts.inverted,
            n_ll_frames: counts.ll,
            n_rr_frames: counts.rr,
            is_inverted,
            is_ll,
            is_rr,
            is_always_low,
            measurements: Measurements::default(),
        }
    }

    /// Diagnosis for a stream whose channels were not scanned.
    pub fn unchecked(n_channels: u16) -> Self {
        Self {
            channels_checked: false,
            is_always_low: false,
            ..Self::from_counts(n_channels, FrameCounts::default())
        }
    }

    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = measurements;
        self
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

impl fmt::Display for StreamDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.measurements;
        writeln!(f, "n_channels: {}", self.n_channels)?;
        writeln!(f, "n_tested_frames: {}", self.n_tested_frames)?;
        writeln!(f, "n_valid_frames: {}", self.n_valid_frames)?;
        writeln!(f, "n_inverted_frames: {}", self.n_inverted_frames)?;
        writeln!(f, "n_ll_frames: {}", self.n_ll_frames)?;
        writeln!(f, "n_rr_frames: {}", self.n_rr_frames)?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "AlwaysLow: {}", self.is_always_low)?;
        writeln!(f, "Inverted: {}", self.is_inverted)?;
        writeln!(f, "LL: {}", self.is_ll)?;
        writeln!(f, "RR: {}", self.is_rr)?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Volume Mean: {}", opt(m.volume_mean))?;
        writeln!(f, "Volume Max: {}", opt(m.volume_max))?;
        writeln!(f, "Loudness Integrated (LUFS): {}", opt(m.loudness_integrated))?;
        writeln!(f, "Loudness Range: {}", opt(m.loudness_range))?;
        writeln!(f, "Loudness Range Low: {}", opt(m.loudness_range_low))?;
        write!(f, "Loudness Range High: {}", opt(m.loudness_range_high))
    }
}

/// Accumulates frame classifications.
#[derive(Debug, Clone)]
pub struct ChannelAnalyzer {
    layout: PcmLayout,
    n_channels: u16,
    settings: AnalyzerSettings,
    counts: FrameCounts,
}

impl ChannelAnalyzer {
    /// Fails with `UnsupportedSampleWidth` outside 1 to 4 bytes.
    pub fn new(n_channels: u16, width: u16, settings: AnalyzerSettings) -> CoreResult<Self> {
        Ok(Self {
            layout: PcmLayout::new(width)?,
            n_channels,
            settings,
            counts: FrameCounts::default(),
        })
    }

    pub fn layout(&self) -> PcmLayout {
        self.layout
    }

    pub fn counts(&self) -> FrameCounts {
        self.counts
    }

    /// Adds one frame given as raw words, one per channel. Only the first two
    /// channels are classified.
    pub fn push_frame(&mut self, samples: &[u64]) {
        self.counts.tested += 1;
        let [left, right, ..] = samples else {
            return;
        };
        match classify_frame(
            &self.layout,
            *left,
            *right,
            self.settings.loud_bound,
            self.settings.invert_bound,
        ) {
            FrameClass::Ignored => {}
            FrameClass::Valid { inverted, side } => {
                self.counts.valid += 1;
                if inverted {
                    self.counts.inverted += 1;
                }
                match side {
                    Some(Side::Left) => self.counts.ll += 1,
                    Some(Side::Right) => self.counts.rr += 1,
                    None => {}
                }
            }
        }
    }

    pub fn finish(self) -> StreamDiagnosis {
        StreamDiagnosis::from_counts(self.n_channels, self.counts)
    }

    /// Scans interleaved little-endian PCM from `reader`.
    ///
    /// `skip_frames` frames are discarded first. A stream with no whole frame
    /// after that window is reported unchecked. A trailing partial frame is
    /// ignored.
    pub fn analyze<R: Read>(
        mut reader: R,
        n_channels: u16,
        width: u16,
        settings: AnalyzerSettings,
    ) -> CoreResult<StreamDiagnosis> {
        let mut analyzer = Self::new(n_channels, width, settings)?;
        let channels = usize::from(n_channels.max(1));
        let sample_bytes = usize::from(width);
        let frame_bytes = sample_bytes * channels;

        let skip_bytes = settings.skip_frames * frame_bytes as u64;
        let skipped = io::copy(&mut reader.by_ref().take(skip_bytes), &mut io::sink())?;
        if skipped < skip_bytes {
            log::warn!("Stream ended inside the {} frame skip window", settings.skip_frames);
            return Ok(StreamDiagnosis::unchecked(n_channels));
        }

        let mut frame = vec![0u8; frame_bytes];
        let mut samples = vec![0u64; channels];
        while settings.frame_count == 0 || analyzer.counts.tested < settings.frame_count {
            match reader.read_exact(&mut frame) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            for (slot, chunk) in samples.iter_mut().zip(frame.chunks_exact(sample_bytes)) {
                *slot = analyzer.layout.decode(chunk);
            }
            analyzer.push_frame(&samples);
        }

        if analyzer.counts.tested == 0 {
            log::warn!("No frames left to scan after skipping {}", settings.skip_frames);
            return Ok(StreamDiagnosis::unchecked(n_channels));
        }
        let diagnosis = analyzer.finish();
        log::debug!(
            "Scanned {} frames: {} valid, {} inverted, {} LL, {} RR",
            diagnosis.n_tested_frames,
            diagnosis.n_valid_frames,
            diagnosis.n_inverted_frames,
            diagnosis.n_ll_frames,
            diagnosis.n_rr_frames
        );
        Ok(diagnosis)
    }
}
