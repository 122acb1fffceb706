//! Phone-to-watch replication layer.
//!
//! One-directional: the phone computes the next-24h snapshot and pushes
//! the whole list as one replace-style payload; the watch overwrites its
//! local cache wholesale and runs its own scheduling sweep against it.
//! Transport failures are retried by the hosting periodic-work mechanism;
//! a failed push leaves the watch cache stale until the next success,
//! which is acceptable staleness bounded by the sweep interval.

pub mod cache;
pub mod debounce;
pub mod node_id;
pub mod payload;
pub mod phone;
pub mod transport;
pub mod watch;

#[cfg(test)]
mod phone_tests;
#[cfg(test)]
mod watch_tests;

pub use cache::{SnapshotCache, CACHE_FILE};
pub use debounce::{Clock, Debouncer, SystemClock};
pub use node_id::{get_or_create_node_id, get_or_create_node_id_at, NodeIdError};
pub use payload::{EventsSnapshot, SnapshotEvent, EVENTS_PATH, SYNC_REQUEST_PATH};
pub use phone::{snapshot_horizon, PhoneSyncPipeline};
pub use transport::{LoopbackTransport, SyncTransport};
pub use watch::WatchSyncListener;
