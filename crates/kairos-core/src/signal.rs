//! In-process signal bus.
//!
//! Replaces platform broadcast intents: the firing path, the sync pipeline
//! and the stores announce here, and UI-facing consumers subscribe.
//! Delivery is lossy fan-out; a slow subscriber observes a lag error and
//! resubscribes.

use tokio::sync::broadcast;

use crate::alarm::AlarmPayload;

/// Cross-component notifications.
#[derive(Debug, Clone)]
pub enum Signal {
    /// The device calendar reported a content change.
    CalendarChanged,
    /// The local upcoming-events state changed (reload or cache overwrite).
    EventsUpdated,
    /// A snapshot push completed.
    SyncPushed { generated_at: i64 },
    /// The OS alarm callback fired for an occurrence.
    AlarmFired(AlarmPayload),
    /// An alerting session started.
    AlertStarted { unique_id: i32 },
    /// The user stopped the alert addressed by `unique_id`.
    AlertStopped { unique_id: i32 },
}

#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl SignalBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Emit to whoever is listening. A bus with no subscribers is fine.
    pub fn emit(&self, signal: Signal) {
        let _ = self.tx.send(signal);
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}
