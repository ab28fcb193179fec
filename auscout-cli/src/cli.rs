// auscout-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use auscout_core::external::ProberTool;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Auscout: audio track, protocol and channel inspection",
    long_about = "Lists and scores audio tracks, races stream transport protocols, \
                  classifies AAC profiles and checks stereo channel integrity \
                  using ffprobe, mediainfo and ffmpeg via the auscout-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Primary prober to use (ffprobe or avprobe)
    #[arg(long, global = true, value_name = "TOOL", default_value_t = ProberTool::Ffprobe)]
    pub prober: ProberTool,

    // --- Tool Locations ---
    /// Path to the primary prober binary
    #[arg(long, global = true, value_name = "PATH", env = "AUSCOUT_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Path to the mediainfo binary
    #[arg(long, global = true, value_name = "PATH", env = "AUSCOUT_MEDIAINFO")]
    pub mediainfo: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true, value_name = "PATH", env = "AUSCOUT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists the audio tracks of a file or stream and picks the best one
    Tracks(TracksArgs),

    /// Finds the fastest working transport protocol for a stream URL
    Race(RaceArgs),

    /// Classifies the AAC profile of one track of a local file
    #[command(name = "aac-profile")]
    AacProfile(AacProfileArgs),

    /// Checks a WAV file for inverted, one-sided or silent channels
    #[command(name = "check-wav")]
    CheckWav(CheckWavArgs),
}

impl Commands {
    /// Short name used in log file names.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Tracks(_) => "tracks",
            Commands::Race(_) => "race",
            Commands::AacProfile(_) => "aac-profile",
            Commands::CheckWav(_) => "check-wav",
        }
    }
}

/// Options shared by every command that runs the primary prober.
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Extra prober input options, split on whitespace (e.g. "-user_agent auscout")
    #[arg(long, value_name = "OPTIONS", allow_hyphen_values = true)]
    pub input_options: Option<String>,

    /// Probe attempts before giving up
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Timeout for a single probe, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl ProbeArgs {
    pub fn input_options(&self) -> Vec<String> {
        self.input_options
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[derive(Args, Debug)]
pub struct TracksArgs {
    /// Local file path or stream URL
    #[arg(required = true, value_name = "LOCATOR")]
    pub locator: String,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Args, Debug)]
pub struct RaceArgs {
    /// Stream URL (mms, rtsp, rtmp, http, ...) or local file path
    #[arg(required = true, value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Timed attempts per candidate protocol
    #[arg(long, value_name = "N")]
    pub repeat: Option<u32>,
}

#[derive(Args, Debug)]
pub struct AacProfileArgs {
    /// Local media file
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Audio track index, in probe order
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub track: usize,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Args, Debug)]
pub struct CheckWavArgs {
    /// WAV file to analyze
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    // --- Analyzer Overrides ---
    /// Frames to scan after the skipped lead-in (0 scans to the end)
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Magnitude a channel must exceed for a frame to be valid
    #[arg(long, value_name = "N")]
    pub loud_bound: Option<u32>,

    /// Maximum deviation from a perfect mirror for an inverted frame
    #[arg(long, value_name = "N")]
    pub invert_bound: Option<u32>,

    /// Leading frames to skip before scanning
    #[arg(long, value_name = "N")]
    pub skip_frames: Option<u64>,

    // --- Measurements ---
    /// Measure mean and max volume with ffmpeg's volumedetect filter
    #[arg(long)]
    pub volume: bool,

    /// Measure EBU R128 loudness with the ebur128 filter
    #[arg(long)]
    pub loudness: bool,

    /// Timeout for each measurement filter, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub filter_timeout: Option<u64>,
}
