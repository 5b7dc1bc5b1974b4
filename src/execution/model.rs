use crate::api::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ExecutionStatus {
    #[serde(rename = "queued", alias = "pending")]
    #[strum(to_string = "queued")]
    Queued,
    #[serde(rename = "running")]
    #[strum(to_string = "running")]
    Running,
    #[serde(rename = "terminado", alias = "finished")]
    #[strum(to_string = "finished")]
    Finished,
    #[serde(rename = "fallido", alias = "failed")]
    #[strum(to_string = "failed")]
    Failed,
    #[serde(other)]
    #[strum(to_string = "unknown")]
    Unknown,
}

/// Background search job as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Id,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub location: Option<String>,
    pub status: ExecutionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, alias = "total_results", alias = "results_count")]
    pub result_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardChart {
    #[serde(default, rename = "successRate")]
    pub success_rate: f64,
    #[serde(default)]
    pub timeline: Vec<Value>,
}
