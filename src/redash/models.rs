//! Snapshot types decoded from the Redash status API.

use serde::{Deserialize, Deserializer};

use super::DecodeError;

/// One element of a database metric pair.
///
/// Redash reports storage metrics as two-element arrays whose element
/// order and typing are not fixed by contract, so each cell decodes into
/// a tagged variant and reconciliation happens afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricCell {
    Number(f64),
    Text(String),
    /// Anything else (null, bool, nested values). Ignored downstream.
    Other(serde_json::Value),
}

/// Point-in-time system status of the target Redash instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub dashboards_count: f64,
    #[serde(default)]
    pub database_metrics: DatabaseMetrics,
    #[serde(default)]
    pub manager: Manager,
    #[serde(default)]
    pub queries_count: f64,
    #[serde(default)]
    pub query_results_count: f64,
    #[serde(default)]
    pub redis_used_memory: f64,
    #[serde(default)]
    pub unused_query_results_count: f64,
    #[serde(default, rename = "version")]
    pub redash_version: String,
    #[serde(default)]
    pub widgets_count: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseMetrics {
    #[serde(default)]
    pub metrics: Vec<Vec<MetricCell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manager {
    /// Arrives as a bare number or as a quoted numeric string depending
    /// on the Redash version.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub outdated_queries_count: f64,
    #[serde(default)]
    pub queues: Queues,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Queues {
    #[serde(default)]
    pub celery: QueueDepth,
    #[serde(default)]
    pub queries: QueueDepth,
    #[serde(default)]
    pub scheduled_queries: QueueDepth,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QueueDepth {
    #[serde(default)]
    pub size: f64,
}

/// List of currently executing or scheduled background jobs.
///
/// Only the entry count is published; the descriptor fields are modeled
/// so a structurally valid payload decodes cleanly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDescriptor {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub worker_pid: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub queue: String,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub enqueue_time: Option<f64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub org_id: Option<i64>,
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub data_source_id: Option<i64>,
}

/// Accept a JSON number or a numeric string, defaulting to zero for
/// null. Anything else fails the field.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("non-numeric string: {s:?}"))),
        serde_json::Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}

/// Decode a system status payload.
pub fn decode_status(body: &[u8]) -> Result<StatusSnapshot, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Decode a task list payload.
pub fn decode_tasks(body: &[u8]) -> Result<TaskSnapshot, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))
}
