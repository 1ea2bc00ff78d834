use super::CliError;
use anyhow::Context;
use jethadron_core::common::AnalysisConfig;
use jethadron_core::modules::{HistogramRegistry, RunCounters, TaskOutput, load_config};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `--log-level` when set.
pub(super) fn init_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub(super) fn load_run_config(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    match path {
        Some(path) => load_config(path).map_err(CliError::Compute),
        None => Ok(AnalysisConfig::default()),
    }
}

pub(super) fn ensure_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RunSummary<'a> {
    pub(super) input: String,
    pub(super) configuration: &'a AnalysisConfig,
    pub(super) counters: RunCounters,
    pub(super) registry: &'a HistogramRegistry,
}

impl<'a> RunSummary<'a> {
    pub(super) fn new(
        input: &Path,
        configuration: &'a AnalysisConfig,
        output: &'a TaskOutput<HistogramRegistry>,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            configuration,
            counters: output.counters,
            registry: &output.sink,
        }
    }
}
