//! Watch-side receive path.

use super::cache::SnapshotCache;
use super::payload::{EventsSnapshot, EVENTS_PATH};
use crate::error::CoreError;
use crate::signal::{Signal, SignalBus};

/// Listens on the data channel and keeps the local cache current.
pub struct WatchSyncListener {
    cache: SnapshotCache,
    bus: SignalBus,
}

impl WatchSyncListener {
    pub fn new(cache: SnapshotCache, bus: SignalBus) -> Self {
        Self { cache, bus }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Data-changed callback for one path.
    ///
    /// A snapshot payload overwrites the cache wholesale -- no incremental
    /// merge; payloads are small and staleness is bounded by the sync
    /// cadence. After the overwrite an events-updated signal refreshes the
    /// UI, and the returned count tells the host to run the watch
    /// scheduling sweep against the new cache. Foreign paths are ignored;
    /// malformed bodies read as empty and self-heal on the next push.
    pub fn on_data_changed(&self, path: &str, body: &[u8]) -> Result<Option<usize>, CoreError> {
        if path != EVENTS_PATH {
            return Ok(None);
        }

        let snapshot = EventsSnapshot::decode_or_empty(body);
        let count = snapshot.events.len();
        self.cache.replace(&snapshot)?;
        tracing::info!(
            count,
            generated_at = snapshot.generated_at,
            "watch cache overwritten"
        );
        self.bus.emit(Signal::EventsUpdated);
        Ok(Some(count))
    }
}
