pub mod azure;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::model::work_item::{WorkItemId, WorkItemRecord};

/// A remote tracker the extraction pipeline reads from.
#[async_trait]
pub trait WorkItemSource: Send + Sync {
    fn name(&self) -> &str;
    /// Names of every project in the organization.
    async fn list_projects(&self) -> Result<Vec<String>>;
    /// Run a WIQL query and return the matching ids in response order.
    async fn query_ids(&self, query: &str) -> Result<Vec<WorkItemId>>;
    /// Fetch `fields` for `ids` and flatten each returned item.
    async fn fetch_batch(&self, ids: &[WorkItemId], fields: &[&str]) -> Result<Vec<WorkItemRecord>>;
}


pub fn create_source(config: &AppConfig) -> azure::AzureDevOpsClient {
    azure::AzureDevOpsClient::new(
        &config.base_url,
        &config.account,
        &config.default_project,
        &config.default_team,
        &config.credentials,
    )
}
