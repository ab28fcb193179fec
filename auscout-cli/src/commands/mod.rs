//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! helpers here turn the global flags into a `CoreConfig` and print results
//! either as JSON or through the human output functions.

pub mod aac;
pub mod race;
pub mod tracks;
pub mod wav;

use crate::cli::{Cli, Commands, ProbeArgs};
use crate::error::{CliErrorContext, CliResult};

use auscout_core::config::{CoreConfig, CoreConfigBuilder};
use auscout_core::external::{FfprobeExecutor, check_dependency};
use serde::Serialize;
use std::time::Duration;

/// Runs the parsed command.
pub fn run(cli: &Cli) -> CliResult<()> {
    let builder = base_config(cli);
    match &cli.command {
        Commands::Tracks(args) => tracks::run_tracks(args, builder, cli.json),
        Commands::Race(args) => race::run_race(args, builder, cli.json),
        Commands::AacProfile(args) => aac::run_aac_profile(args, builder, cli.json),
        Commands::CheckWav(args) => wav::run_check_wav(args, builder, cli.json),
    }
}

/// Builder seeded with the prober choice and tool locations.
pub fn base_config(cli: &Cli) -> CoreConfigBuilder {
    let mut builder = CoreConfigBuilder::new().prober(cli.prober);
    if let Some(path) = &cli.ffprobe {
        builder = builder.prober_path(path);
    }
    if let Some(path) = &cli.mediainfo {
        builder = builder.mediainfo_path(path);
    }
    if let Some(path) = &cli.ffmpeg {
        builder = builder.ffmpeg_path(path);
    }
    builder
}

/// Applies `--retries` and `--timeout` to the single-probe settings.
pub fn apply_probe_args(mut builder: CoreConfigBuilder, args: &ProbeArgs) -> CoreConfigBuilder {
    if let Some(retries) = args.retries {
        builder = builder.probe_retries(retries);
    }
    if let Some(secs) = args.timeout {
        builder = builder.probe_timeout(Duration::from_secs(secs));
    }
    builder
}

/// Builds and validates the final configuration.
pub fn build(builder: CoreConfigBuilder) -> CliResult<CoreConfig> {
    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Primary prober for `config`, after checking that its binary runs.
pub fn primary_prober(config: &CoreConfig) -> CliResult<FfprobeExecutor> {
    let prober = FfprobeExecutor::from_config(config);
    check_dependency(prober.binary())?;
    Ok(prober)
}

/// Prints `value` as pretty JSON when `json` is set, otherwise runs `human`.
pub fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> CliResult<()> {
    if json {
        let text = serde_json::to_string_pretty(value)
            .cli_with_context(|| "Failed to render JSON output")?;
        println!("{text}");
    } else {
        human();
    }
    Ok(())
}
