// auscout-core/tests/channel_analysis_tests.rs

mod common;

use auscout_core::analysis::{
    AnalyzerSettings, ChannelAnalyzer, MeasurementRequest, analyze_wav_file,
};
use auscout_core::external::{LoudnessStats, MeasurementProvider, VolumeStats};
use common::write_stereo_wav;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn small_settings() -> AnalyzerSettings {
    AnalyzerSettings {
        frame_count: 0,
        skip_frames: 100,
        ..Default::default()
    }
}

/// 100 warm-up frames, then `frames` loud frames where 9 of every 10 are
/// mirrored and the tenth is identical on both sides.
fn mostly_inverted(frames: usize) -> Vec<(i16, i16)> {
    let mut out = vec![(0i16, 0i16); 100];
    out.extend((0..frames).map(|i| {
        let amplitude = 2000 + (i % 7) as i16 * 1000;
        if i % 10 == 9 {
            (amplitude, amplitude)
        } else {
            (amplitude, -amplitude)
        }
    }));
    out
}

#[test]
fn test_mirrored_channels_detected_as_inverted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inverted.wav");
    write_stereo_wav(&path, mostly_inverted(1000));

    let d = analyze_wav_file(&path, &small_settings(), None).unwrap();
    assert_eq!(d.n_tested_frames, 1000);
    assert_eq!(d.n_valid_frames, 1000);
    assert_eq!(d.n_inverted_frames, 900);
    assert!(d.is_inverted);
    assert!(!d.is_ll);
    assert!(!d.is_rr);
    assert!(!d.is_always_low);
}

#[test]
fn test_identical_channels_are_healthy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono_like.wav");
    let frames = (0..2000).map(|i| {
        let v = ((i % 50) as i16 - 25) * 400;
        (v, v)
    });
    write_stereo_wav(&path, frames);

    let d = analyze_wav_file(&path, &small_settings(), None).unwrap();
    assert!(d.n_valid_frames > 0);
    assert_eq!(d.n_inverted_frames, 0);
    assert!(!d.is_inverted);
    assert!(!d.is_ll);
    assert!(!d.is_rr);
}

#[test]
fn test_left_only_channel() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("left.wav");
    let frames = (0..1000).map(|i| (if i % 2 == 0 { 8000 } else { -8000 }, 10));
    write_stereo_wav(&path, frames);

    let d = analyze_wav_file(&path, &small_settings(), None).unwrap();
    assert!(d.is_ll);
    assert!(!d.is_rr);
    assert!(!d.is_inverted);
}

#[test]
fn test_silence_is_always_low() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quiet.wav");
    write_stereo_wav(&path, (0..5000).map(|i| ((i % 3) as i16, -((i % 3) as i16))));

    let d = analyze_wav_file(&path, &small_settings(), None).unwrap();
    assert_eq!(d.n_valid_frames, 0);
    assert!(d.is_always_low);
    assert!(!d.is_inverted);
}

#[test]
fn test_raw_stream_matches_wav_result() {
    let frames = mostly_inverted(500);
    let pcm: Vec<u8> = frames
        .iter()
        .flat_map(|(l, r)| l.to_le_bytes().into_iter().chain(r.to_le_bytes()))
        .collect();

    let d = ChannelAnalyzer::analyze(Cursor::new(pcm), 2, 2, small_settings()).unwrap();
    assert_eq!(d.n_tested_frames, 500);
    assert_eq!(d.n_inverted_frames, 450);
    assert!(d.is_inverted);
}

struct BrokenFilters;

impl MeasurementProvider for BrokenFilters {
    fn volume(&self, _: &Path, _: Duration) -> VolumeStats {
        VolumeStats { mean: Some(-30.2), max: None }
    }

    fn loudness(&self, _: &Path, _: Duration) -> LoudnessStats {
        LoudnessStats::default()
    }
}

#[test]
fn test_unavailable_measurements_are_not_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("measured.wav");
    write_stereo_wav(&path, mostly_inverted(200));

    let request = MeasurementRequest::new(&BrokenFilters)
        .volume(true)
        .loudness(true);
    let d = analyze_wav_file(&path, &small_settings(), Some(&request)).unwrap();
    assert_eq!(d.measurements.volume_mean, Some(-30.2));
    assert_eq!(d.measurements.volume_max, None);
    assert_eq!(d.measurements.loudness_integrated, None);
    assert!(d.is_inverted);

    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["volume_mean"], -30.2);
    assert!(json["loudness_range"].is_null());
    assert_eq!(json["is_inverted"], true);
}
