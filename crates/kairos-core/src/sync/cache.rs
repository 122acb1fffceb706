//! Watch-side snapshot cache.
//!
//! Holds the most recent push from the phone, overwritten wholesale on
//! each successful receipt -- no incremental merge. The cache survives
//! connectivity loss; missing or corrupt contents read as empty and the
//! next successful sync rewrites them. An empty cache is a valid state
//! (no watch-side alarms until first sync).

use std::path::{Path, PathBuf};

use super::payload::EventsSnapshot;
use crate::error::StoreError;
use crate::event::Event;

pub const CACHE_FILE: &str = "events24h.json";

pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(crate::storage::data_dir()?.join(CACHE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cached snapshot wholesale.
    pub fn replace(&self, snapshot: &EventsSnapshot) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::SaveFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// The cached snapshot; empty when nothing has synced yet or the file
    /// is unreadable.
    pub fn load(&self) -> EventsSnapshot {
        match std::fs::read(&self.path) {
            Ok(body) => EventsSnapshot::decode_or_empty(&body),
            Err(_) => EventsSnapshot::default(),
        }
    }

    /// Cached occurrences as domain events.
    pub fn events(&self) -> Vec<Event> {
        self.load().to_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::payload::SnapshotEvent;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> SnapshotCache {
        SnapshotCache::new(dir.path().join(CACHE_FILE))
    }

    fn snapshot(generated_at: i64, ids: &[i64]) -> EventsSnapshot {
        EventsSnapshot::new(
            generated_at,
            ids.iter()
                .map(|id| SnapshotEvent {
                    id: *id,
                    title: format!("event {id}"),
                    start: 1_723_111_200_000 + id * 60_000,
                    recurring: false,
                })
                .collect(),
        )
    }

    #[test]
    fn empty_cache_is_a_valid_state() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        assert_eq!(cache.load(), EventsSnapshot::default());
        assert!(cache.events().is_empty());
    }

    #[test]
    fn overwrite_leaves_exactly_the_second_snapshot() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        cache.replace(&snapshot(1, &[1, 2, 3])).unwrap();
        let b = snapshot(2, &[4, 5]);
        cache.replace(&b).unwrap();

        let loaded = cache.load();
        assert_eq!(loaded, b);
        let ids: Vec<i64> = loaded.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn corrupt_cache_reads_empty_and_self_heals() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::write(cache.path(), b"]][[ not json").unwrap();

        assert!(cache.events().is_empty());

        cache.replace(&snapshot(3, &[9])).unwrap();
        assert_eq!(cache.load().events.len(), 1);
    }
}
