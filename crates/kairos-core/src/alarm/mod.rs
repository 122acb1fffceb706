//! Exact-alarm registration and the firing/alert path.

pub mod alert;
pub mod scheduler;

pub use alert::{AlertCenter, AlertGate, AlertPhase, AlertSession};
pub use scheduler::{AlarmScheduler, ExactAlarmBackend, InProcessAlarms, PendingAlarm};

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Payload carried by every registration so the firing path can render
/// the alert without re-querying the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmPayload {
    /// Occurrence identity; also the notification id the stop action
    /// must address.
    pub unique_id: i32,
    pub event_id: i64,
    pub event_title: String,
    /// Occurrence start, epoch milliseconds.
    pub event_start_millis: i64,
}

impl AlarmPayload {
    pub fn for_event(event: &Event) -> Self {
        Self {
            unique_id: event.unique_intent_id(),
            event_id: event.id,
            event_title: event.title.clone(),
            event_start_millis: event.start_millis(),
        }
    }
}
