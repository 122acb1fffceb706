//! Full-screen alert path: firing state machine, alerting session, and the
//! single-alert latch.
//!
//! Lifecycle per alarm instance:
//!
//! ```text
//! Scheduled -> Fired -> Alerting -> Dismissed
//! ```
//!
//! `Fired` is the OS callback; it immediately transitions to `Alerting` by
//! starting a looping sound/vibration session and raising the alert.
//! `Dismissed` is reached only via the explicit user stop action (never a
//! timeout), addressed by the same occurrence-derived notification id.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::AlarmPayload;
use crate::signal::{Signal, SignalBus};

/// Lifecycle phase of one alarm instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    Scheduled,
    Fired,
    Alerting,
    Dismissed,
}

impl std::fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertPhase::Scheduled => "scheduled",
            AlertPhase::Fired => "fired",
            AlertPhase::Alerting => "alerting",
            AlertPhase::Dismissed => "dismissed",
        };
        f.write_str(name)
    }
}

/// At-most-one-alerting-session latch.
///
/// Owned by the alert center rather than living as a process global;
/// acquire/release use compare-and-swap semantics.
#[derive(Debug, Default)]
pub struct AlertGate(AtomicBool);

impl AlertGate {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// True when this caller took the gate; false while a session holds it.
    pub fn acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One live alerting session: looping sound and/or vibration plus a
/// cancellable notification, all addressed by the occurrence identity.
#[derive(Debug, Clone)]
pub struct AlertSession {
    pub payload: AlarmPayload,
    /// Notification id; equals the occurrence identity so a later stop
    /// action addresses exactly this alert.
    pub notification_id: i32,
    pub sound: bool,
    pub vibrate: bool,
    pub started_at: DateTime<Utc>,
}

/// Receives fired alarms and drives the alert lifecycle on each device
/// independently.
pub struct AlertCenter {
    gate: AlertGate,
    session: Mutex<Option<AlertSession>>,
    bus: SignalBus,
}

impl AlertCenter {
    pub fn new(bus: SignalBus) -> Self {
        Self {
            gate: AlertGate::new(),
            session: Mutex::new(None),
            bus,
        }
    }

    /// OS alarm callback: `Fired -> Alerting`.
    ///
    /// A second fire while a session is alerting folds into the existing
    /// session instead of starting a concurrent alert -- at most one
    /// foreground alert path is meaningful to the user.
    pub fn on_alarm_fired(
        &self,
        payload: AlarmPayload,
        vibrate_only: bool,
        now: DateTime<Utc>,
    ) -> AlertPhase {
        self.bus.emit(Signal::AlarmFired(payload.clone()));

        if !self.gate.acquire() {
            tracing::debug!(
                unique_id = payload.unique_id,
                "alert already active, folding fire into current session"
            );
            return AlertPhase::Alerting;
        }

        let session = AlertSession {
            notification_id: payload.unique_id,
            sound: !vibrate_only,
            vibrate: true,
            payload,
            started_at: now,
        };
        let unique_id = session.notification_id;
        tracing::info!(unique_id, sound = session.sound, "alert session started");
        *self.session.lock().unwrap() = Some(session);
        self.bus.emit(Signal::AlertStarted { unique_id });
        AlertPhase::Alerting
    }

    /// Explicit user stop addressed by the notification id:
    /// `Alerting -> Dismissed`. Releases sound/vibration resources and
    /// cancels the notification. A stop for an id with no active session
    /// returns `None` and changes nothing.
    pub fn dismiss(&self, unique_id: i32) -> Option<AlertPhase> {
        let mut guard = self.session.lock().unwrap();
        match guard.take() {
            Some(session) if session.notification_id == unique_id => {
                self.gate.release();
                tracing::info!(unique_id, "alert session dismissed");
                self.bus.emit(Signal::AlertStopped { unique_id });
                Some(AlertPhase::Dismissed)
            }
            other => {
                *guard = other;
                None
            }
        }
    }

    pub fn active_session(&self) -> Option<AlertSession> {
        self.session.lock().unwrap().clone()
    }

    pub fn is_alerting(&self) -> bool {
        self.gate.is_held()
    }
}
