//! Phone-side replication pipeline.
//!
//! Pushes the next-24h snapshot to the watch as one replace-style payload.
//! Three triggers feed it: the periodic companion sweep (~15 min), an
//! explicit pull-request message from the watch, and calendar-change
//! notifications routed through the debouncer so observer bursts coalesce
//! into a single push.

use chrono::{DateTime, Duration, Utc};

use super::debounce::{default_window, Clock, Debouncer, SystemClock};
use super::payload::{EventsSnapshot, SnapshotEvent, EVENTS_PATH, SYNC_REQUEST_PATH};
use super::transport::SyncTransport;
use crate::calendar::CalendarSource;
use crate::error::CoreError;
use crate::signal::{Signal, SignalBus};

/// How far ahead the replicated snapshot reaches.
pub fn snapshot_horizon() -> Duration {
    Duration::hours(24)
}

pub struct PhoneSyncPipeline<S, T, C: Clock = SystemClock> {
    source: S,
    transport: T,
    debounce: Debouncer<C>,
    bus: SignalBus,
    node_id: String,
}

impl<S: CalendarSource, T: SyncTransport> PhoneSyncPipeline<S, T, SystemClock> {
    pub fn new(source: S, transport: T, bus: SignalBus, node_id: String) -> Self {
        Self::with_clock(source, transport, bus, node_id, SystemClock)
    }
}

impl<S: CalendarSource, T: SyncTransport, C: Clock> PhoneSyncPipeline<S, T, C> {
    pub fn with_clock(
        source: S,
        transport: T,
        bus: SignalBus,
        node_id: String,
        clock: C,
    ) -> Self {
        Self {
            source,
            transport,
            debounce: Debouncer::with_clock(default_window(), clock),
            bus,
            node_id,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of everything starting within the horizon. A permission
    /// gap upstream yields an empty snapshot, which still replicates (the
    /// watch then clears its own alarms on the next sweep).
    pub fn build_snapshot(&self, now: DateTime<Utc>) -> Result<EventsSnapshot, CoreError> {
        let events = self
            .source
            .occurrences_between(now, now + snapshot_horizon())?;
        let records = events.iter().map(SnapshotEvent::from).collect();
        Ok(EventsSnapshot::new(now.timestamp_millis(), records))
    }

    /// Build and push one snapshot. Returns the replicated event count.
    pub fn push(&mut self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let snapshot = self.build_snapshot(now)?;
        let body = snapshot.encode()?;
        self.transport.put(EVENTS_PATH, &body)?;
        tracing::info!(
            node = %self.node_id,
            count = snapshot.events.len(),
            "pushed events snapshot"
        );
        self.bus.emit(Signal::SyncPushed {
            generated_at: snapshot.generated_at,
        });
        Ok(snapshot.events.len())
    }

    /// Calendar content-observer notification. Bursts coalesce; the
    /// actual push happens once the debounce window elapses in `poll`.
    pub fn on_calendar_changed(&mut self) {
        self.debounce.signal();
        self.bus.emit(Signal::CalendarChanged);
    }

    /// Incoming message from the watch. A pull request triggers one
    /// immediate push; foreign paths are ignored.
    pub fn on_message(&mut self, path: &str, now: DateTime<Utc>) -> Result<Option<usize>, CoreError> {
        if path != SYNC_REQUEST_PATH {
            return Ok(None);
        }
        self.push(now).map(Some)
    }

    /// Drive pending debounced work. Returns the pushed count when a
    /// coalesced push ran.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Result<Option<usize>, CoreError> {
        if self.debounce.due() {
            self.push(now).map(Some)
        } else {
            Ok(None)
        }
    }
}
