//! Implementation of the 'aac-profile' subcommand.

use crate::cli::AacProfileArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{print_heading, print_info};

use auscout_core::aac::AacProfile;
use auscout_core::config::CoreConfigBuilder;
use auscout_core::external::{MediaInfoExecutor, check_dependency_with_arg};
use auscout_core::media::ProbeSession;
use serde::Serialize;
use std::fs;

use log::debug;

#[derive(Serialize)]
struct AacReport<'a> {
    file: String,
    track: usize,
    profile: AacProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    codec: Option<&'a str>,
}

pub fn run_aac_profile(
    args: &AacProfileArgs,
    builder: CoreConfigBuilder,
    json: bool,
) -> CliResult<()> {
    fs::metadata(&args.file)
        .cli_with_context(|| format!("Cannot access input file '{}'", args.file.display()))?;

    let config = super::build(super::apply_probe_args(builder, &args.probe))?;
    let prober = super::primary_prober(&config)?;
    let mediainfo = MediaInfoExecutor::from_config(&config);
    check_dependency_with_arg(mediainfo.binary(), "--Version")?;

    let locator = args.file.to_string_lossy().into_owned();
    debug!("Classifying track {} of {}", args.track, locator);
    let mut session = ProbeSession::from_config(prober, locator.as_str(), &config)
        .with_input_options(args.probe.input_options());
    let profile = session.aac_profile(&mediainfo, args.track)?;
    let codec = session
        .track_list(false)
        .get(args.track)
        .map(|t| t.codec.clone());

    let report = AacReport {
        file: locator,
        track: args.track,
        profile,
        codec: codec.as_deref(),
    };
    super::emit(json, &report, || {
        print_heading(&format!("AAC profile of {}", report.file));
        print_info("Track", report.track);
        if let Some(codec) = report.codec {
            print_info("Codec", codec);
        }
        print_info("Profile", report.profile);
    })
}
