use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn auscout_cmd() -> Command {
    let mut cmd = Command::cargo_bin("auscout").expect("Failed to find auscout binary");
    cmd.env_remove("AUSCOUT_FFPROBE")
        .env_remove("AUSCOUT_MEDIAINFO")
        .env_remove("AUSCOUT_FFMPEG")
        .env_remove("RUST_LOG");
    cmd
}

/// 16-bit stereo WAV where every frame is mirrored between the channels.
fn write_inverted_wav(path: &Path, frames: usize) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..frames {
        let amplitude: i16 = if i % 2 == 0 { 4000 } else { -6000 };
        writer.write_sample(amplitude)?;
        writer.write_sample(-amplitude)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn test_help_lists_subcommands() {
    auscout_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("tracks"))
        .stdout(contains("race"))
        .stdout(contains("aac-profile"))
        .stdout(contains("check-wav"));
}

#[test]
fn test_check_wav_json_reports_inversion() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let wav = dir.path().join("inverted.wav");
    write_inverted_wav(&wav, 2000)?;

    auscout_cmd()
        .arg("check-wav")
        .arg(&wav)
        .args(["--skip-frames", "0", "--json"])
        .assert()
        .success()
        .stdout(contains("\"is_inverted\": true"))
        .stdout(contains("\"n_tested_frames\": 2000"))
        .stdout(contains("\"volume_mean\": null"));

    Ok(())
}

#[test]
fn test_check_wav_human_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let wav = dir.path().join("inverted.wav");
    write_inverted_wav(&wav, 500)?;

    auscout_cmd()
        .arg("check-wav")
        .arg(&wav)
        .args(["--skip-frames", "100"])
        .assert()
        .success()
        .stdout(contains("Channel check of"))
        .stdout(contains("Verdict"))
        .stdout(contains("400"));

    Ok(())
}

#[test]
fn test_check_wav_short_file_is_not_checked() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let wav = dir.path().join("short.wav");
    write_inverted_wav(&wav, 50)?;

    auscout_cmd()
        .arg("check-wav")
        .arg(&wav)
        .arg("--json")
        .assert()
        .success()
        .stdout(contains("\"channels_checked\": false"))
        .stdout(contains("\"is_always_low\": false"));

    Ok(())
}

#[test]
fn test_check_wav_non_existent_input() {
    auscout_cmd()
        .args(["check-wav", "surely/this/does/not/exist/take.wav"])
        .assert()
        .failure()
        .stderr(contains("Cannot access input file"));
}

#[test]
fn test_check_wav_log_dir_creates_log_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let wav = dir.path().join("inverted.wav");
    write_inverted_wav(&wav, 300)?;
    let log_dir = dir.path().join("logs");

    auscout_cmd()
        .arg("check-wav")
        .arg(&wav)
        .args(["--skip-frames", "0", "--log-dir"])
        .arg(&log_dir)
        .assert()
        .success();

    let logs: Vec<_> = std::fs::read_dir(&log_dir)?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("auscout_check-wav_"));
    assert!(logs[0].ends_with(".log"));

    Ok(())
}

#[test]
fn test_race_unknown_scheme() {
    auscout_cmd()
        .args(["race", "gopher://example.com/stream", "--ffprobe", "true"])
        .assert()
        .failure()
        .stderr(contains("Unsupported protocol scheme 'gopher'"));
}

#[test]
fn test_tracks_missing_prober() {
    auscout_cmd()
        .args(["tracks", "song.m4a", "--ffprobe", "/surely/not/a/real/ffprobe"])
        .assert()
        .failure()
        .stderr(contains("Required dependency"));
}

#[test]
fn test_tracks_zero_retries_rejected() {
    auscout_cmd()
        .args(["tracks", "song.m4a", "--retries", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid configuration"));
}

#[test]
fn test_aac_profile_non_existent_input() {
    auscout_cmd()
        .args(["aac-profile", "surely/not/here.m4a"])
        .assert()
        .failure()
        .stderr(contains("Cannot access input file"));
}
