use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task item. `category_id` of `None` means uncategorized.
///
/// Timestamps are stored as milliseconds since epoch so the persisted JSON
/// stays compatible across schema versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}
