use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::fields;

pub type WorkItemId = i64;

/// Field reference names requested from the batch endpoint, in column order.
pub const FIELDS: [&str; 8] = [
    "System.Id",
    "System.WorkItemType",
    "System.Title",
    "System.AssignedTo",
    "System.State",
    "System.IterationPath",
    "Microsoft.VSTS.Scheduling.OriginalEstimate",
    "Microsoft.VSTS.Scheduling.CompletedWork",
];

/// CSV header, one column per entry in [`FIELDS`].
pub const COLUMNS: [&str; 8] = [
    "ID",
    "Work Item Type",
    "Title",
    "Assigned To",
    "State",
    "Iteration Path",
    "Original Estimate",
    "Completed Work",
];

static NULL: Value = Value::Null;

/// One exported row. Any field missing from the API response stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemRecord {
    #[serde(rename = "ID")]
    pub id: Option<WorkItemId>,
    #[serde(rename = "Work Item Type")]
    pub work_item_type: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Assigned To")]
    pub assigned_to: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Iteration Path")]
    pub iteration_path: Option<String>,
    #[serde(rename = "Original Estimate", serialize_with = "fields::serialize_hours")]
    pub original_estimate: Option<f64>,
    #[serde(rename = "Completed Work", serialize_with = "fields::serialize_hours")]
    pub completed_work: Option<f64>,
}

impl WorkItemRecord {
    /// Flatten the `fields` object of a batch response entry.
    pub fn from_fields(map: &Map<String, Value>) -> Self {
        let get = |name: &str| map.get(name).unwrap_or(&NULL);

        Self {
            id: fields::integer(get(FIELDS[0])),
            work_item_type: fields::text(get(FIELDS[1])),
            title: fields::text(get(FIELDS[2])).map(|t| fields::strip_control_whitespace(&t)),
            assigned_to: fields::extract_display_name(get(FIELDS[3])),
            state: fields::text(get(FIELDS[4])),
            iteration_path: fields::text(get(FIELDS[5])),
            original_estimate: fields::number(get(FIELDS[6])),
            completed_work: fields::number(get(FIELDS[7])),
        }
    }
}
