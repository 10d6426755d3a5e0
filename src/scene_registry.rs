//! Scene Registry
//!
//! Static mapping from scene id to display metadata, populated once at
//! startup from the catalogue lookup. Read-only afterwards except for
//! lazy placeholder naming when an event references an unknown id.
//!
//! Scene identity is case-insensitive for state purposes: ids differing
//! only in case address the same scene. Display strings keep the form
//! they were first seen in.

use crate::models::SceneRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Number of id characters used in synthesized placeholder names
const PLACEHOLDER_ID_CHARS: usize = 8;

/// Scene catalogue with lazy placeholder naming
pub struct SceneRegistry {
    /// Records keyed by normalized (lowercase) scene id
    records: RwLock<HashMap<String, SceneRecord>>,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-populated from the catalogue
    pub fn with_scenes(scenes: Vec<SceneRecord>) -> Self {
        let records = scenes
            .into_iter()
            .map(|s| (Self::state_key(&s.id), s))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Normalized state key for a scene id
    pub fn state_key(id: &str) -> String {
        id.to_ascii_lowercase()
    }

    /// Placeholder display name for an unknown scene id.
    ///
    /// Ids shorter than the prefix length are used whole, no padding.
    pub fn placeholder_name(id: &str) -> String {
        let prefix: String = id.chars().take(PLACEHOLDER_ID_CHARS).collect();
        format!("Scene-{prefix}")
    }

    /// Resolve the display name for a scene, caching the result.
    ///
    /// A name already supplied by the catalogue or a prior event wins and
    /// is never overwritten. Otherwise the event-supplied name is cached;
    /// failing that, a placeholder is synthesized and cached.
    pub async fn resolve_name(&self, id: &str, event_name: Option<&str>) -> String {
        let key = Self::state_key(id);

        {
            let records = self.records.read().await;
            if let Some(record) = records.get(&key) {
                return record.display_name.clone();
            }
        }

        let mut records = self.records.write().await;
        // Re-check under the write lock in case another update raced us
        if let Some(record) = records.get(&key) {
            return record.display_name.clone();
        }

        let display_name = event_name
            .map(str::to_string)
            .unwrap_or_else(|| Self::placeholder_name(id));

        tracing::debug!(
            scene_id = %id,
            display_name = %display_name,
            "Caching name for unknown scene"
        );

        records.insert(
            key,
            SceneRecord {
                id: id.to_string(),
                display_name: display_name.clone(),
                status: "unknown".to_string(),
            },
        );

        display_name
    }

    /// Get a scene record by id
    pub async fn get(&self, id: &str) -> Option<SceneRecord> {
        self.records.read().await.get(&Self::state_key(id)).cloned()
    }

    /// All known scene records
    pub async fn all(&self) -> Vec<SceneRecord> {
        self.records.read().await.values().cloned().collect()
    }

    /// Number of known scenes
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the registry holds no scenes
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> SceneRecord {
        SceneRecord {
            id: id.to_string(),
            display_name: name.to_string(),
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_placeholder_truncates_to_eight_chars() {
        assert_eq!(
            SceneRegistry::placeholder_name("3bc091c7-e449-46a0-9540-29c499bca18c"),
            "Scene-3bc091c7"
        );
    }

    #[test]
    fn test_placeholder_short_id_used_whole() {
        assert_eq!(SceneRegistry::placeholder_name("abc"), "Scene-abc");
    }

    #[tokio::test]
    async fn test_catalogue_name_wins_over_event_name() {
        let registry = SceneRegistry::with_scenes(vec![record("scene-a", "Lobby")]);
        let name = registry.resolve_name("scene-a", Some("Renamed")).await;
        assert_eq!(name, "Lobby");
    }

    #[tokio::test]
    async fn test_event_name_cached_for_unknown_scene() {
        let registry = SceneRegistry::new();
        let first = registry.resolve_name("scene-x", Some("Warehouse")).await;
        assert_eq!(first, "Warehouse");

        // A later event cannot overwrite the cached name
        let second = registry.resolve_name("scene-x", Some("Other")).await;
        assert_eq!(second, "Warehouse");
    }

    #[tokio::test]
    async fn test_placeholder_cached_when_no_name_available() {
        let registry = SceneRegistry::new();
        let name = registry.resolve_name("3bc091c7-e449", None).await;
        assert_eq!(name, "Scene-3bc091c7");

        let record = registry.get("3bc091c7-e449").await.unwrap();
        assert_eq!(record.display_name, "Scene-3bc091c7");
        assert_eq!(record.status, "unknown");
    }

    #[tokio::test]
    async fn test_ids_differing_only_in_case_are_one_scene() {
        let registry = SceneRegistry::with_scenes(vec![record("Scene-A", "Lobby")]);
        assert_eq!(registry.resolve_name("SCENE-A", None).await, "Lobby");
        assert_eq!(registry.resolve_name("scene-a", Some("Other")).await, "Lobby");
        assert_eq!(registry.len().await, 1);
    }
}
