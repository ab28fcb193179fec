//! Core library for inspecting audio media with ffprobe, mediainfo and ffmpeg.
//!
//! This crate enumerates and scores audio tracks, races transport protocols
//! for stream URLs, classifies AAC sub-profiles by cross-checking two probers,
//! and detects inverted, one-sided or silent stereo channels in PCM audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use auscout_core::config::CoreConfigBuilder;
//! use auscout_core::external::{FfprobeExecutor, ProberTool};
//! use auscout_core::protocol::ProtocolRacer;
//!
//! let config = CoreConfigBuilder::new().race_repeat(3).build();
//! config.validate().unwrap();
//!
//! let prober = FfprobeExecutor::new(ProberTool::Ffprobe);
//! let selection = ProtocolRacer::from_config(prober, &config)
//!     .select("mms://radio.example.com/live", &[])
//!     .unwrap();
//! println!(
//!     "{} in {:.2}s: {}",
//!     selection.selected_scheme, selection.average_connect_time, selection.winning_track.codec
//! );
//! ```

pub mod aac;
pub mod analysis;
pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod media;
pub mod protocol;

// Re-exports for public API
pub use aac::{AacProfile, classify_aac_profile};
pub use analysis::{AnalyzerSettings, ChannelAnalyzer, StreamDiagnosis, analyze_wav_file};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{
    FfmpegFilterRunner, FfprobeExecutor, MediaInfoExecutor, MeasurementProvider, PrimaryProber,
    ProberTool, SecondaryProber, check_dependency,
};
pub use media::{AudioTrack, ProbeSession, probe_tracks, select_best_track};
pub use protocol::{
    Clock, ProtocolCandidate, ProtocolRacer, ProtocolSelection, SystemClock, select_protocol,
};
