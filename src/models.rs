//! Domain models
//!
//! Wire types for the regulated scene topic and the derived occupancy
//! statistics. Inbound payloads are decoded once at the boundary into
//! strict optional-field structs; downstream logic never probes raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked object inside a scene event payload.
///
/// Older payload versions label people via `type`, newer ones via
/// `category`; both fields are optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TrackedObject {
    /// Person classification with OR-semantics: either field matching is
    /// sufficient, which tolerates schema drift between payload versions.
    pub fn is_person(&self) -> bool {
        self.object_type.as_deref() == Some("person") || self.category.as_deref() == Some("person")
    }
}

/// Decoded scene occupancy event.
///
/// A single message reporting the current set of detected objects in a
/// scene at one point in time. `id` is required by the contract but kept
/// optional here so validation happens in one place with no side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEvent {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub objects: Vec<TrackedObject>,
}

impl SceneEvent {
    /// Number of person-classified objects in this snapshot.
    pub fn person_count(&self) -> u32 {
        self.objects.iter().filter(|o| o.is_person()).count() as u32
    }
}

/// Scene catalogue record.
///
/// Created once during registry population; immutable afterwards except
/// that a placeholder record may be synthesized for an unknown scene id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    pub display_name: String,
    pub status: String,
}

/// Per-scene occupancy snapshot.
///
/// `peak_count >= current_count` always; `peak_count` is monotonically
/// non-decreasing for the process lifetime. `current_count` is replaced
/// on every event for the scene, reflecting the latest snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SceneOccupancy {
    pub scene_id: String,
    pub display_name: String,
    pub current_count: u32,
    pub peak_count: u32,
}

/// Aggregate occupancy statistics across all scenes.
///
/// `total_current` equals the sum of current counts over all known
/// scenes, recomputed on every update; `total_peak >= total_current`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    pub total_current: u32,
    pub total_peak: u32,
    pub message_count: u64,
    pub last_update: Option<DateTime<Utc>>,
}
