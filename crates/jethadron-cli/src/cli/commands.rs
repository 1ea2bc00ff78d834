use super::CliError;
use super::helpers::{RunSummary, ensure_parent_dir, init_logging, load_run_config};
use anyhow::Context;
use jethadron_core::common::AnalysisConfig;
use jethadron_core::modules::serialization::write_json_artifact;
use jethadron_core::modules::{ChargedJetHadronTask, EventStreamReader, HistogramRegistry};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Analysis configuration (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Event stream, one JSON record per line
    #[arg(long)]
    input: PathBuf,

    /// Summary output path
    #[arg(long)]
    output: PathBuf,

    /// Log verbosity when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

pub(super) fn run_analysis_command(args: RunArgs) -> Result<i32, CliError> {
    init_logging(args.log_level);

    let config = load_run_config(args.config.as_deref())?;
    let mut task =
        ChargedJetHadronTask::new(config, HistogramRegistry::new()).map_err(CliError::Compute)?;
    let reader = EventStreamReader::open(&args.input).map_err(CliError::Compute)?;
    info!(input = %args.input.display(), "reading event stream");
    task.run(reader).map_err(CliError::Compute)?;

    let config = task.config().clone();
    let output = task.finish();
    ensure_parent_dir(&args.output)?;
    let summary = RunSummary::new(&args.input, &config, &output);
    write_json_artifact(&args.output, &summary).map_err(CliError::Compute)?;

    let counters = output.counters;
    println!(
        "Processed {} records: {} detector events selected, {} particle events accepted, {} mixed pairings.",
        counters.records,
        counters.detector_events_selected,
        counters.particle_events_accepted,
        counters.mixed_pairings
    );
    println!("JSON summary: {}", args.output.display());
    Ok(0)
}

pub(super) fn run_default_config_command() -> Result<i32, CliError> {
    let rendered = serde_json::to_string_pretty(&AnalysisConfig::default())
        .context("failed to render default configuration")?;
    println!("{}", rendered);
    Ok(0)
}
