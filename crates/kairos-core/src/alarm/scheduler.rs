//! Idempotent exact-alarm registration keyed by occurrence identity.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::AlarmPayload;
use crate::event::Event;

/// OS exact-alarm facility boundary.
///
/// Registrations are keyed by occurrence identity: setting the same
/// identity twice replaces the earlier trigger, which is the idempotence
/// guarantee the policy pass relies on. On platforms that gate exact
/// scheduling behind a capability, `can_schedule_exact` reports the
/// current grant.
pub trait ExactAlarmBackend: Send {
    fn can_schedule_exact(&self) -> bool {
        true
    }

    /// Register a wake-capable exact trigger, replacing any existing
    /// registration for `identity`.
    fn set_exact_wake(&mut self, trigger_at: DateTime<Utc>, identity: i32, payload: AlarmPayload);

    /// Remove the pending trigger for `identity`. No-op if none exists.
    fn cancel(&mut self, identity: i32);
}

/// Schedule/cancel operations addressed by `unique_intent_id`.
pub struct AlarmScheduler<B: ExactAlarmBackend> {
    backend: B,
}

impl<B: ExactAlarmBackend> AlarmScheduler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Register a wake trigger at the occurrence start.
    ///
    /// When the exact-alarm capability is denied this is a silent no-op:
    /// accepted degraded mode, and prompting for the grant belongs to the
    /// UI layer. No success/failure is reported either way.
    pub fn schedule(&mut self, event: &Event) {
        if !self.backend.can_schedule_exact() {
            tracing::debug!(
                unique_id = event.unique_intent_id(),
                "exact alarms unavailable, skipping registration"
            );
            return;
        }
        self.backend.set_exact_wake(
            event.start_time,
            event.unique_intent_id(),
            AlarmPayload::for_event(event),
        );
    }

    /// Remove any pending trigger for the occurrence. No-op if none.
    pub fn cancel(&mut self, event: &Event) {
        self.backend.cancel(event.unique_intent_id());
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// One registered trigger in the in-process table.
#[derive(Debug, Clone)]
pub struct PendingAlarm {
    pub trigger_at: DateTime<Utc>,
    pub payload: AlarmPayload,
}

/// Wall-clock, tick-driven alarm table.
///
/// No internal thread -- the caller invokes `tick()` periodically and due
/// triggers fire, returning their payloads earliest first. Stands in for
/// the platform alarm facility on hosts without one (tests, the CLI). A
/// capability flag models the OS denying the exact-alarm grant.
#[derive(Debug)]
pub struct InProcessAlarms {
    pending: HashMap<i32, PendingAlarm>,
    exact_allowed: bool,
}

impl InProcessAlarms {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            exact_allowed: true,
        }
    }

    /// Model the OS policy denying or restoring the exact-alarm grant.
    pub fn set_exact_allowed(&mut self, allowed: bool) {
        self.exact_allowed = allowed;
    }

    pub fn pending(&self) -> &HashMap<i32, PendingAlarm> {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Fire everything due at `now`, earliest first.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<AlarmPayload> {
        let mut due: Vec<i32> = self
            .pending
            .iter()
            .filter(|(_, alarm)| alarm.trigger_at <= now)
            .map(|(identity, _)| *identity)
            .collect();
        due.sort_by_key(|identity| self.pending[identity].trigger_at);
        due.into_iter()
            .filter_map(|identity| self.pending.remove(&identity))
            .map(|alarm| alarm.payload)
            .collect()
    }
}

impl Default for InProcessAlarms {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactAlarmBackend for InProcessAlarms {
    fn can_schedule_exact(&self) -> bool {
        self.exact_allowed
    }

    fn set_exact_wake(&mut self, trigger_at: DateTime<Utc>, identity: i32, payload: AlarmPayload) {
        self.pending
            .insert(identity, PendingAlarm { trigger_at, payload });
    }

    fn cancel(&mut self, identity: i32) {
        self.pending.remove(&identity);
    }
}
