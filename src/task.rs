// Data model for the task queue

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single queue item
///
/// Optional keys default on read (`done = false`, `tags = []`, no detail), so
/// files written by older versions or by hand load without absence checks
/// anywhere else in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: i64,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Create a fresh task with a new id and the current timestamp
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            detail: None,
            tags: Vec::new(),
            created_at: now_ms(),
            done: false,
        }
    }
}

/// On-disk shape of the data file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    #[serde(default)]
    pub todos: Vec<Task>,
}

/// Generate an opaque, time-ordered task id
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a comma separated tag list, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
