//! Channel integrity analysis of decoded PCM audio.
//!
//! [`ChannelAnalyzer`] scans interleaved PCM frames for inverted and
//! one-sided stereo channels and for audio that never gets loud.
//! [`analyze_wav_file`] runs it over a WAV file and can add whole-file
//! volume and loudness measurements from a [`MeasurementProvider`].
//!
//! [`MeasurementProvider`]: crate::external::MeasurementProvider

pub mod channel;
pub mod pcm;
pub mod wav;

pub use channel::{
    AnalyzerSettings, ChannelAnalyzer, FrameClass, FrameCounts, Measurements, Side,
    StreamDiagnosis, classify_frame,
};
pub use pcm::PcmLayout;
pub use wav::{MeasurementRequest, analyze_wav_file};
