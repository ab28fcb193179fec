//! Implementation of the 'race' subcommand.
//!
//! Probes every candidate transport of a stream URL several times and
//! reports the one with the lowest average connect time.

use crate::cli::RaceArgs;
use crate::error::CliResult;
use crate::output::{print_heading, print_info};

use auscout_core::config::CoreConfigBuilder;
use auscout_core::protocol::ProtocolRacer;
use std::time::Duration;

use log::info;

pub fn run_race(args: &RaceArgs, builder: CoreConfigBuilder, json: bool) -> CliResult<()> {
    // --timeout bounds each racing attempt rather than a single local probe
    let mut builder = builder;
    if let Some(retries) = args.probe.retries {
        builder = builder.probe_retries(retries);
    }
    if let Some(secs) = args.probe.timeout {
        builder = builder.race_timeout(Duration::from_secs(secs));
    }
    if let Some(repeat) = args.repeat {
        builder = builder.race_repeat(repeat);
    }
    let config = super::build(builder)?;
    let prober = super::primary_prober(&config)?;

    info!(
        "Racing protocols for {} ({} attempts each)",
        args.url, config.race_repeat
    );
    let selection =
        ProtocolRacer::from_config(prober, &config).select(&args.url, &args.probe.input_options())?;

    super::emit(json, &selection, || {
        print_heading(&format!("Protocol race for {}", args.url));
        print_info("Selected protocol", &selection.selected_scheme);
        print_info(
            "Average connect time",
            format!("{:.3} s", selection.average_connect_time),
        );
        print_info("Locator", &selection.locator);
        if !selection.input_options.is_empty() {
            print_info("Input options", selection.input_options.join(" "));
        }
        super::tracks::print_track(&selection.winning_track, true);
    })
}
