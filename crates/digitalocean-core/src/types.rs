//! Shared DigitalOcean domain types.
//!
//! Actions are returned by every service that starts asynchronous work
//! (droplets, volumes, images, ...), so they live here rather than in a
//! service crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status of an action that is still running.
pub const ACTION_IN_PROGRESS: &str = "in-progress";

/// Status of an action that finished successfully.
pub const ACTION_COMPLETED: &str = "completed";

/// Status of an action that failed.
pub const ACTION_ERRORED: &str = "errored";

/// Deserialize a value that the API may send as `null` into its default.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An asynchronous operation performed on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action id.
    pub id: i64,
    /// Current status (`in-progress`, `completed` or `errored`).
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub status: String,
    /// Kind of action (e.g. `transfer`, `convert`).
    #[serde(rename = "type", default, deserialize_with = "deserialize_null_default")]
    pub action_type: String,
    /// When the action started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the action finished, unset while it is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Id of the resource the action runs against.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub resource_id: i64,
    /// Kind of resource (e.g. `image`).
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub resource_type: String,
    /// Region the action runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Slug of the region the action runs in.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub region_slug: String,
}

impl Action {
    /// Whether the action is still running.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == ACTION_IN_PROGRESS
    }

    /// Whether the action finished successfully.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ACTION_COMPLETED
    }

    /// Whether the action failed.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.status == ACTION_ERRORED
    }
}

/// A DigitalOcean datacenter region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region slug (e.g. `nyc3`).
    pub slug: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Size slugs available in the region.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Whether new resources can be created in the region.
    #[serde(default)]
    pub available: bool,
    /// Features supported by the region.
    #[serde(default)]
    pub features: Vec<String>,
}
