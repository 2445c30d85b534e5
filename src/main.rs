//! fceplus - course workload annotations for the SIO schedule planner.
//!
//! Diagnostic entry point: exercises the dataset, configuration and engine
//! outside a browser page.

mod cli;
mod cmd_lookup;
mod cmd_total;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fceplus_dataset::{DatasetError, ReferenceDataset};
use fceplus_engine::EngineConfig;

use crate::cli::{Cli, Commands, DatasetSource};

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env().context("invalid FCEPLUS_* environment")?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Lookup { ids, source } => {
            let config = with_source(config, &source)?;
            cmd_lookup::handle_lookup(&config, &source, &ids).await
        }
        Commands::Total { ids, source } => {
            let config = with_source(config, &source)?;
            cmd_total::handle_total(&config, &source, &ids).await
        }
    }
}

/// Apply a `--url` override and re-validate.
fn with_source(mut config: EngineConfig, source: &DatasetSource) -> anyhow::Result<EngineConfig> {
    if let Some(url) = &source.url {
        config.dataset_url = url.clone();
        config.validate().context("invalid --url")?;
    }
    Ok(config)
}

/// Load the dataset from `--file`, or fetch it from the configured URL.
pub(crate) async fn load_dataset(
    config: &EngineConfig,
    source: &DatasetSource,
) -> Result<ReferenceDataset, DatasetError> {
    match &source.file {
        Some(path) => {
            Ok(ReferenceDataset::from_file(path)?.with_aliases(&config.course_aliases))
        }
        None => config.dataset_client()?.load().await,
    }
}
