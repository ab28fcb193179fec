//! Implementation of the 'tracks' subcommand.

use crate::cli::TracksArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{print_heading, print_info, print_section};

use auscout_core::config::CoreConfigBuilder;
use auscout_core::media::{AudioTrack, ProbeSession};
use serde::Serialize;

use log::info;

#[derive(Serialize)]
struct TracksReport<'a> {
    locator: &'a str,
    tracks: &'a [AudioTrack],
    best_track: &'a AudioTrack,
}

pub fn run_tracks(args: &TracksArgs, builder: CoreConfigBuilder, json: bool) -> CliResult<()> {
    let config = super::build(super::apply_probe_args(builder, &args.probe))?;
    let prober = super::primary_prober(&config)?;

    info!("Probing audio tracks of {}", args.locator);
    let mut session = ProbeSession::from_config(prober, args.locator.as_str(), &config)
        .with_input_options(args.probe.input_options());
    let tracks = session.track_list(false).to_vec();
    let best = session
        .best_track(false)
        .cloned()
        .cli_with_context(|| format!("No audio tracks found in '{}'", args.locator))?;

    let report = TracksReport {
        locator: &args.locator,
        tracks: &tracks,
        best_track: &best,
    };
    super::emit(json, &report, || {
        print_heading(&format!("Audio tracks of {}", args.locator));
        for track in &tracks {
            print_track(track, track == &best);
        }
    })
}

pub fn print_track(track: &AudioTrack, best: bool) {
    let title = if best {
        format!("Track {} (best)", track.index)
    } else {
        format!("Track {}", track.index)
    };
    print_section(&title);
    print_info("Codec", &track.codec);
    print_info("Bit rate", format!("{} bps", track.bit_rate));
    print_info("Sample rate", format!("{} Hz", track.sample_rate));
    print_info("Channels", track.channels);
    print_info("Duration", format!("{:.2} s", track.duration));
    print_info("Container", &track.format_name);
}
