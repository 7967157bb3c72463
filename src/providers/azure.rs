use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::WorkItemSource;
use crate::error::ApiError;
use crate::model::credentials::Credentials;
use crate::model::work_item::{WorkItemId, WorkItemRecord};

const WIQL_API_VERSION: &str = "5.1";
const PROJECTS_API_VERSION: &str = "6.0";

pub struct AzureDevOpsClient {
    query_url: String,
    batch_url: String,
    projects_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl AzureDevOpsClient {
    pub fn new(
        base_url: &str,
        account: &str,
        project: &str,
        team: &str,
        credentials: &Credentials,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        let account = urlencoding::encode(account);
        let project = urlencoding::encode(project);
        let team = urlencoding::encode(team);
        Self {
            query_url: format!(
                "{base}/{account}/{project}/{team}/_apis/wit/wiql?api-version={WIQL_API_VERSION}"
            ),
            batch_url: format!(
                "{base}/{account}/{project}/_apis/wit/workitemsbatch?api-version={WIQL_API_VERSION}"
            ),
            projects_url: format!("{base}/{account}/_apis/projects?api-version={PROJECTS_API_VERSION}"),
            auth_header: credentials.authorization_header(),
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, endpoint: &'static str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = request
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .with_context(|| format!("Azure DevOps {endpoint} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint,
                status,
                body,
            }
            .into());
        }
        Ok(resp)
    }
}

#[derive(Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems")]
    work_items: Vec<WorkItemRef>,
}

#[derive(Deserialize)]
struct WorkItemRef {
    id: WorkItemId,
}

#[derive(Deserialize)]
struct BatchResponse {
    value: Vec<BatchItem>,
}

#[derive(Deserialize)]
struct BatchItem {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct ProjectsResponse {
    value: Vec<ProjectRef>,
}

#[derive(Deserialize)]
struct ProjectRef {
    name: String,
}

#[async_trait]
impl WorkItemSource for AzureDevOpsClient {
    fn name(&self) -> &str {
        "Azure DevOps"
    }

    async fn list_projects(&self) -> Result<Vec<String>> {
        tracing::debug!(url = %self.projects_url, "GET projects");
        let resp = self
            .send(
                "projects",
                self.client
                    .get(&self.projects_url)
                    .header("Content-Type", "application/json"),
            )
            .await?;
        let projects: ProjectsResponse = resp
            .json()
            .await
            .context("Failed to parse Azure DevOps project list")?;
        Ok(projects.value.into_iter().map(|p| p.name).collect())
    }

    async fn query_ids(&self, query: &str) -> Result<Vec<WorkItemId>> {
        tracing::debug!(url = %self.query_url, "POST wiql");
        let body = serde_json::json!({ "query": query });
        let resp = self
            .send("wiql", self.client.post(&self.query_url).json(&body))
            .await?;
        let wiql: WiqlResponse = resp
            .json()
            .await
            .context("Failed to parse Azure DevOps query response")?;
        Ok(wiql.work_items.into_iter().map(|wi| wi.id).collect())
    }

    async fn fetch_batch(&self, ids: &[WorkItemId], fields: &[&str]) -> Result<Vec<WorkItemRecord>> {
        tracing::debug!(url = %self.batch_url, count = ids.len(), "POST workitemsbatch");
        let body = serde_json::json!({ "ids": ids, "fields": fields });
        let resp = self
            .send("workitemsbatch", self.client.post(&self.batch_url).json(&body))
            .await?;
        let batch: BatchResponse = resp
            .json()
            .await
            .context("Failed to parse Azure DevOps work item batch")?;

        let items = batch
            .value
            .iter()
            .map(|item| WorkItemRecord::from_fields(&item.fields))
            .collect();

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_item::FIELDS;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureDevOpsClient {
        AzureDevOpsClient::new(
            &server.uri(),
            "contoso",
            "Platform",
            "Platform Team",
            &Credentials::new("ana".into(), "s3cret".into()),
        )
    }

    #[tokio::test]
    async fn query_ids_posts_wiql_with_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/Platform/Platform%20Team/_apis/wit/wiql"))
            .and(query_param("api-version", "5.1"))
            .and(header("Authorization", "Basic YW5hOnMzY3JldA=="))
            .and(body_json(json!({ "query": "Select [System.Id] From WorkItems" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "queryType": "flat",
                "workItems": [ { "id": 11, "url": "x" }, { "id": 5, "url": "y" } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = client_for(&server)
            .query_ids("Select [System.Id] From WorkItems")
            .await
            .unwrap();
        assert_eq!(ids, vec![11, 5]);
    }

    #[tokio::test]
    async fn fetch_batch_flattens_in_response_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/Platform/_apis/wit/workitemsbatch"))
            .and(body_json(json!({ "ids": [1, 2], "fields": FIELDS })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "value": [
                    { "id": 2, "fields": { "System.Id": 2, "System.Title": "Second\titem" } },
                    { "id": 1, "fields": {
                        "System.Id": 1,
                        "System.Title": "First",
                        "System.AssignedTo": { "displayName": "Ana Souza" },
                        "Microsoft.VSTS.Scheduling.CompletedWork": 3
                    } }
                ]
            })))
            .mount(&server)
            .await;

        let records = client_for(&server).fetch_batch(&[1, 2], &FIELDS).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(2));
        assert_eq!(records[0].title.as_deref(), Some("Seconditem"));
        assert_eq!(records[0].assigned_to, None);
        assert_eq!(records[1].assigned_to.as_deref(), Some("Ana Souza"));
        assert_eq!(records[1].completed_work, Some(3.0));
    }

    #[tokio::test]
    async fn posts_carry_a_single_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/Platform/Platform%20Team/_apis/wit/wiql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workItems": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/contoso/Platform/_apis/wit/workitemsbatch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.query_ids("q").await.unwrap();
        client.fetch_batch(&[1], &FIELDS).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            let values: Vec<_> = request.headers.get_all("content-type").iter().collect();
            assert_eq!(values.len(), 1, "{}", request.url);
            assert_eq!(values[0], "application/json");
        }
    }

    #[tokio::test]
    async fn list_projects_reads_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contoso/_apis/projects"))
            .and(query_param("api-version", "6.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "value": [ { "name": "Payments" }, { "name": "Search" } ]
            })))
            .mount(&server)
            .await;

        let projects = client_for(&server).list_projects().await.unwrap();
        assert_eq!(projects, vec!["Payments", "Search"]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("TF400813: not authorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).query_ids("q").await.unwrap_err();
        let api = err.downcast_ref::<ApiError>().expect("typed api error");
        let ApiError::Status { status, body, .. } = api;
        assert_eq!(status.as_u16(), 401);
        assert!(body.contains("TF400813"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
            .mount(&server)
            .await;

        let err = client_for(&server).query_ids("q").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
