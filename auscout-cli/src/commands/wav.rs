//! Implementation of the 'check-wav' subcommand.
//!
//! Runs the channel integrity analysis over a WAV file, optionally adding
//! whole-file volume and loudness measurements from ffmpeg.

use crate::cli::CheckWavArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{
    print_flag, print_heading, print_info, print_measurement, print_section, print_warning,
};

use auscout_core::analysis::{MeasurementRequest, StreamDiagnosis, analyze_wav_file};
use auscout_core::config::CoreConfigBuilder;
use auscout_core::external::{FfmpegFilterRunner, check_dependency};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub fn run_check_wav(args: &CheckWavArgs, builder: CoreConfigBuilder, json: bool) -> CliResult<()> {
    fs::metadata(&args.file)
        .cli_with_context(|| format!("Cannot access input file '{}'", args.file.display()))?;

    let mut builder = builder;
    if let Some(frames) = args.frames {
        builder = builder.tested_frames(frames);
    }
    if let Some(bound) = args.loud_bound {
        builder = builder.loud_bound(bound);
    }
    if let Some(bound) = args.invert_bound {
        builder = builder.invert_bound(bound);
    }
    if let Some(frames) = args.skip_frames {
        builder = builder.skip_frames(frames);
    }
    if let Some(secs) = args.filter_timeout {
        builder = builder.filter_timeout(Duration::from_secs(secs));
    }
    let config = super::build(builder)?;

    let diagnosis = if args.volume || args.loudness {
        let runner = FfmpegFilterRunner::from_config(&config);
        if args.volume {
            check_dependency(runner.ffmpeg())?;
        }
        if args.loudness {
            check_dependency(runner.ffprobe())?;
        }
        let request = MeasurementRequest::new(&runner)
            .volume(args.volume)
            .loudness(args.loudness)
            .timeout(config.filter_timeout);
        analyze_wav_file(&args.file, &config.analyzer, Some(&request))?
    } else {
        analyze_wav_file(&args.file, &config.analyzer, None)?
    };

    super::emit(json, &diagnosis, || print_diagnosis(&args.file, &diagnosis, args))
}

fn print_diagnosis(path: &Path, d: &StreamDiagnosis, args: &CheckWavArgs) {
    print_heading(&format!("Channel check of {}", path.display()));
    print_info("Channels", d.n_channels);

    if d.channels_checked {
        print_section("Frames");
        print_info("Tested", d.n_tested_frames);
        print_info("Valid", d.n_valid_frames);
        print_info("Inverted", d.n_inverted_frames);
        print_info("Left only", d.n_ll_frames);
        print_info("Right only", d.n_rr_frames);

        print_section("Verdict");
        print_flag("Always low", d.is_always_low);
        print_flag("Inverted", d.is_inverted);
        print_flag("Left only", d.is_ll);
        print_flag("Right only", d.is_rr);
    } else {
        print_warning("Channels were not checked (not stereo, or shorter than the skipped lead-in)");
    }

    if args.volume || args.loudness {
        let m = &d.measurements;
        print_section("Measurements");
        if args.volume {
            print_measurement("Volume mean", m.volume_mean, "dB");
            print_measurement("Volume max", m.volume_max, "dB");
        }
        if args.loudness {
            print_measurement("Integrated loudness", m.loudness_integrated, "LUFS");
            print_measurement("Loudness range", m.loudness_range, "LU");
            print_measurement("Loudness range low", m.loudness_range_low, "LUFS");
            print_measurement("Loudness range high", m.loudness_range_high, "LUFS");
        }
    }
}
