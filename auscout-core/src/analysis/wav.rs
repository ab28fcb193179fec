//! WAV file entry point for channel integrity analysis.

use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavReader};

use super::channel::{AnalyzerSettings, ChannelAnalyzer, Measurements, StreamDiagnosis};
use crate::config::DEFAULT_FILTER_TIMEOUT;
use crate::error::{CoreError, CoreResult};
use crate::external::{LoudnessStats, MeasurementProvider, VolumeStats};

/// Which whole-file measurements to take, and with what.
pub struct MeasurementRequest<'a> {
    pub provider: &'a dyn MeasurementProvider,
    pub volume: bool,
    pub loudness: bool,
    pub timeout: Duration,
}

impl<'a> MeasurementRequest<'a> {
    pub fn new(provider: &'a dyn MeasurementProvider) -> Self {
        Self {
            provider,
            volume: false,
            loudness: false,
            timeout: DEFAULT_FILTER_TIMEOUT,
        }
    }

    pub fn volume(mut self, enabled: bool) -> Self {
        self.volume = enabled;
        self
    }

    pub fn loudness(mut self, enabled: bool) -> Self {
        self.loudness = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the requested filters. Unrequested values stay `None`.
    pub fn measure(&self, path: &Path) -> Measurements {
        let volume = if self.volume {
            self.provider.volume(path, self.timeout)
        } else {
            VolumeStats::default()
        };
        let loudness = if self.loudness {
            self.provider.loudness(path, self.timeout)
        } else {
            LoudnessStats::default()
        };
        Measurements::from_stats(volume, loudness)
    }
}

/// Checks the channels of a WAV file, plus any requested measurements.
///
/// The channel scan is skipped (with a warning) for files that are not
/// stereo or hold fewer frames than `settings.skip_frames`. Otherwise the
/// window is clamped to the frames left after the skip, and a
/// `frame_count` of 0 takes all of them.
pub fn analyze_wav_file(
    path: &Path,
    settings: &AnalyzerSettings,
    measurements: Option<&MeasurementRequest<'_>>,
) -> CoreResult<StreamDiagnosis> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(CoreError::Wav(hound::Error::Unsupported));
    }
    let width = spec.bits_per_sample.div_ceil(8);
    let n_frames = u64::from(reader.duration());

    let measured = measurements
        .map(|request| request.measure(path))
        .unwrap_or_default();

    if spec.channels != 2 {
        log::warn!("Only files with 2 channels need further check: {}", path.display());
        return Ok(StreamDiagnosis::unchecked(spec.channels).with_measurements(measured));
    }
    if n_frames < settings.skip_frames {
        log::warn!("File too short: {} ({} frames)", path.display(), n_frames);
        return Ok(StreamDiagnosis::unchecked(spec.channels).with_measurements(measured));
    }

    log::info!("Checking channels for {}", path.display());
    let window = n_frames - settings.skip_frames;
    let frame_count = if settings.frame_count == 0 || settings.frame_count > window {
        window
    } else {
        settings.frame_count
    };

    let mut analyzer = ChannelAnalyzer::new(spec.channels, width, *settings)?;
    let layout = analyzer.layout();
    let skip = u32::try_from(settings.skip_frames).map_err(|_| {
        CoreError::Config(format!("skip_frames {} is too large", settings.skip_frames))
    })?;
    reader.seek(skip)?;

    let mut samples = reader.samples::<i32>();
    for _ in 0..frame_count {
        let (Some(left), Some(right)) = (samples.next(), samples.next()) else {
            break;
        };
        let left = layout.raw_from_signed(i64::from(left?));
        let right = layout.raw_from_signed(i64::from(right?));
        analyzer.push_frame(&[left, right]);
    }

    let diagnosis = analyzer.finish().with_measurements(measured);
    log::info!(
        "{}: valid {} / tested {}, inverted {}, LL {}, RR {}",
        path.display(),
        diagnosis.n_valid_frames,
        diagnosis.n_tested_frames,
        diagnosis.n_inverted_frames,
        diagnosis.n_ll_frames,
        diagnosis.n_rr_frames
    );
    Ok(diagnosis)
}
