use anyhow::{Context, Result};

use super::query::{self, QueryMode};
use crate::model::date_range::DateRange;
use crate::model::work_item::WorkItemId;
use crate::providers::WorkItemSource;

/// Ids of the items closed or resolved in `range` for one project.
///
/// Every query of `mode` runs in turn and the results are concatenated as-is, so an
/// item matching more than one query appears more than once.
pub async fn resolve_project_ids(
    source: &dyn WorkItemSource,
    project: &str,
    mode: QueryMode,
    range: &DateRange,
) -> Result<Vec<WorkItemId>> {
    let mut ids = Vec::new();
    for template in mode.templates() {
        let wiql = query::render(template, range, project);
        let found = source
            .query_ids(&wiql)
            .await
            .with_context(|| format!("Failed to query work item ids for project {project}"))?;
        tracing::debug!(project, count = found.len(), "Query returned ids");
        ids.extend(found);
    }
    Ok(ids)
}
