//! Occupancy Tracker
//!
//! Converts decoded scene events into per-scene and aggregate occupancy
//! statistics. A scene's current count is replaced by each event's
//! snapshot (not accumulated); peaks only ever increase.
//!
//! All mutation happens inside one write-lock critical section per
//! update, so snapshots never observe partial state.

use crate::error::{Error, Result};
use crate::models::{AggregateStats, SceneEvent, SceneOccupancy};
use crate::scene_registry::SceneRegistry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-scene counters
#[derive(Debug, Clone, Default)]
struct SceneCounts {
    display_name: String,
    current: u32,
    peak: u32,
}

/// State guarded by a single lock
#[derive(Default)]
struct TrackerState {
    scenes: HashMap<String, SceneCounts>,
    aggregate: AggregateStats,
}

/// Tracks people counts per scene and in aggregate
pub struct OccupancyTracker {
    registry: Arc<SceneRegistry>,
    state: RwLock<TrackerState>,
}

impl OccupancyTracker {
    /// Create a tracker backed by the given registry
    pub fn new(registry: Arc<SceneRegistry>) -> Self {
        Self {
            registry,
            state: RwLock::new(TrackerState::default()),
        }
    }

    /// Apply one decoded event.
    ///
    /// Rejects events without a scene id (`Error::MalformedEvent`) before
    /// touching any state, so a rejected call has no side effects. The
    /// caller logs and continues; this never propagates to the transport.
    pub async fn update(&self, event: &SceneEvent) -> Result<()> {
        let scene_id = match event.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(Error::MalformedEvent(
                    "event missing scene 'id' field".to_string(),
                ))
            }
        };

        let display_name = self
            .registry
            .resolve_name(scene_id, event.name.as_deref())
            .await;
        let count = event.person_count();
        let key = SceneRegistry::state_key(scene_id);

        let mut state = self.state.write().await;

        let entry = state.scenes.entry(key).or_default();
        entry.display_name = display_name;
        entry.current = count;
        entry.peak = entry.peak.max(count);

        let total: u32 = state.scenes.values().map(|s| s.current).sum();
        state.aggregate.total_current = total;
        state.aggregate.total_peak = state.aggregate.total_peak.max(total);
        state.aggregate.message_count += 1;
        state.aggregate.last_update = Some(Utc::now());

        tracing::debug!(
            scene_id = %scene_id,
            people = count,
            total = total,
            "Scene occupancy updated"
        );

        Ok(())
    }

    /// Consistent point-in-time copy of per-scene and aggregate statistics.
    ///
    /// Scenes are ordered by display name for stable report output.
    pub async fn snapshot(&self) -> (Vec<SceneOccupancy>, AggregateStats) {
        let state = self.state.read().await;

        let mut scenes: Vec<SceneOccupancy> = state
            .scenes
            .iter()
            .map(|(id, counts)| SceneOccupancy {
                scene_id: id.clone(),
                display_name: counts.display_name.clone(),
                current_count: counts.current,
                peak_count: counts.peak,
            })
            .collect();
        scenes.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        (scenes, state.aggregate.clone())
    }
}
