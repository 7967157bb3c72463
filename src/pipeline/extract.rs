use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{batch, export, resolve};
use crate::config::AppConfig;
use crate::model::date_range::DateRange;
use crate::model::work_item::{WorkItemId, WorkItemRecord, FIELDS};
use crate::pipeline::query::QueryMode;
use crate::providers::WorkItemSource;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub projects: Vec<String>,
    pub date_range: DateRange,
    pub batch_size: usize,
    pub query_mode: QueryMode,
    pub dedupe_ids: bool,
    pub discover_projects: bool,
    pub output_dir: PathBuf,
}

impl ExtractOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            projects: config.projects.clone(),
            date_range: config.date_range,
            batch_size: config.batch_size,
            query_mode: config.query_mode,
            dedupe_ids: config.dedupe_ids,
            discover_projects: config.discover_projects,
            output_dir: config.output_dir.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub projects: usize,
    pub ids: usize,
    pub batches: usize,
    pub records: usize,
    pub path: PathBuf,
}

/// Resolve ids project by project, fetch them batch by batch, then write the CSV.
///
/// Requests are issued one at a time. Nothing is written unless every request succeeds.
pub async fn run(source: &dyn WorkItemSource, options: &ExtractOptions) -> Result<ExtractSummary> {
    tracing::info!(source = source.name(), "1 - Starting");

    let projects = if options.projects.is_empty() && options.discover_projects {
        source
            .list_projects()
            .await
            .context("Failed to list organization projects")?
    } else {
        options.projects.clone()
    };

    let mut ids: Vec<WorkItemId> = Vec::new();
    for (index, project) in projects.iter().enumerate() {
        tracing::info!(
            "2 - Resolving IDs for project {project} ({}/{})",
            index + 1,
            projects.len()
        );
        let found = resolve::resolve_project_ids(
            source,
            project,
            options.query_mode,
            &options.date_range,
        )
        .await?;
        ids.extend(found);
    }

    if options.dedupe_ids {
        let before = ids.len();
        ids = batch::dedupe(ids);
        tracing::debug!(removed = before - ids.len(), "Dropped duplicate ids");
    }

    tracing::info!("3 - Partitioning {} IDs", ids.len());
    let batches = batch::partition(&ids, options.batch_size);

    let mut records: Vec<WorkItemRecord> = Vec::with_capacity(ids.len());
    for (index, chunk) in batches.iter().enumerate() {
        tracing::info!("4 - Fetching work items ({}/{})", index + 1, batches.len());
        let fetched = source
            .fetch_batch(chunk, &FIELDS)
            .await
            .with_context(|| format!("Failed to fetch work item batch {}", index + 1))?;
        records.extend(fetched);
    }

    tracing::info!("5 - Generating CSV");
    let path = export::write(&options.output_dir, &options.date_range, &records)?;
    tracing::info!("6 - File written: {}", path.display());

    Ok(ExtractSummary {
        projects: projects.len(),
        ids: ids.len(),
        batches: batches.len(),
        records: records.len(),
        path,
    })
}
