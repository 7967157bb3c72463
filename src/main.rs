mod config;
mod error;
mod model;
mod pipeline;
mod providers;
mod util;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use pipeline::extract::{self, ExtractOptions};

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devops_extract=info")),
        )
        .init();

    let config = config::load_config()?;
    tracing::debug!(
        account = %config.account,
        projects = config.projects.len(),
        start = %config.date_range.start_text(),
        end = %config.date_range.end_text(),
        "Configuration loaded"
    );

    let source = providers::create_source(&config);
    let options = ExtractOptions::from_config(&config);
    let summary = extract::run(&source, &options).await?;

    tracing::info!(
        projects = summary.projects,
        ids = summary.ids,
        batches = summary.batches,
        records = summary.records,
        path = %summary.path.display(),
        "Extraction finished"
    );

    Ok(())
}
