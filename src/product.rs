// Product entity and its field constraints

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum name length, counted after trimming
pub const NAME_MIN_LEN: usize = 3;

/// Maximum name length, counted after trimming
pub const NAME_MAX_LEN: usize = 50;

/// Maximum description length
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// A product record
///
/// Products are created by `ProductService::create`, which assigns `id` and
/// both timestamps. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Build a product with a fresh time-ordered id and both timestamps set to `now`
    pub(crate) fn new(name: String, description: Option<String>, now: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Description as a plain string slice, empty when absent
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
