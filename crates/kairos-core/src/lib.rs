//! # Kairos Core Library
//!
//! Core logic for the Kairos calendar-alarm companion: it reads calendar
//! occurrences, decides which ones need a wake-up alarm, registers
//! exact-time triggers, and mirrors the upcoming-events state to a paired
//! watch device. All operations are available through this library; the
//! CLI binary and any GUI shells are thin layers over it.
//!
//! ## Architecture
//!
//! - **Policy engine**: a pure, full-recompute evaluation pass deciding
//!   which candidate occurrences need a pending alarm right now
//! - **Alarm scheduler**: idempotent registrations against the exact-alarm
//!   facility, keyed by the derived occurrence identity
//! - **Wear sync**: snapshot replication to the watch, which overwrites a
//!   local cache and runs the identical policy stack against it
//! - **Storage**: TOML preference store with push-style observability
//!
//! ## Key Components
//!
//! - [`policy::evaluate`]: the scheduling decision pass
//! - [`AlarmCoordinator`]: sweeps, reloads and user toggles
//! - [`PhoneSyncPipeline`] / [`WatchSyncListener`]: the replication ends
//! - [`AlertCenter`]: the firing-to-dismissal alert path

pub mod alarm;
pub mod calendar;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod policy;
pub mod signal;
pub mod storage;
pub mod sync;

pub use alarm::{AlarmPayload, AlarmScheduler, AlertCenter, ExactAlarmBackend, InProcessAlarms};
pub use calendar::{CacheCalendarSource, CalendarSource, FileCalendarSource};
pub use coordinator::{AlarmCoordinator, SweepOutcome};
pub use error::{CoreError, StoreError, SyncError};
pub use event::{occurrence_id, Event};
pub use policy::{evaluate, AlarmRules, Evaluation};
pub use signal::{Signal, SignalBus};
pub use storage::{data_dir, PrefStore, Preferences};
pub use sync::{EventsSnapshot, PhoneSyncPipeline, SnapshotCache, WatchSyncListener};
