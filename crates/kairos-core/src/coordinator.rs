//! Scheduling coordination: sweeps, reloads and user toggles.
//!
//! Each pass is a full recompute over freshly read state -- nothing is
//! carried in memory between sweeps, so the hosting process can be
//! recreated at any point. Overlapping passes are tolerated: schedule and
//! cancel are idempotent and converge at the backend table keyed by
//! occurrence identity.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};

use crate::alarm::{AlarmScheduler, ExactAlarmBackend};
use crate::calendar::CalendarSource;
use crate::error::CoreError;
use crate::event::Event;
use crate::policy::{self, Evaluation};
use crate::signal::{Signal, SignalBus};
use crate::storage::PrefStore;

/// Result of one background sweep, reported to the hosting scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Pass completed; counts are for observability only.
    Completed { scheduled: usize, skipped: usize },
    /// Pass failed. The host may retry on its own cadence; no backoff
    /// state is kept here across sweeps.
    Failed { reason: String },
}

/// Owns the per-device scheduling stack: calendar source, preference
/// store, alarm scheduler and signal bus. The phone instance runs over
/// the provider adapter; the watch instance runs the identical stack over
/// its synced snapshot cache.
pub struct AlarmCoordinator<S, B: ExactAlarmBackend> {
    source: S,
    prefs: PrefStore,
    scheduler: AlarmScheduler<B>,
    bus: SignalBus,
}

impl<S: CalendarSource, B: ExactAlarmBackend> AlarmCoordinator<S, B> {
    pub fn new(source: S, prefs: PrefStore, backend: B, bus: SignalBus) -> Self {
        Self {
            source,
            prefs,
            scheduler: AlarmScheduler::new(backend),
            bus,
        }
    }

    pub fn prefs(&self) -> &PrefStore {
        &self.prefs
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn scheduler(&self) -> &AlarmScheduler<B> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut AlarmScheduler<B> {
        &mut self.scheduler
    }

    /// End of the broad scan horizon: today through the end of next
    /// month. The sliding registration window picks occurrences out of
    /// this pool as later sweeps re-derive it from their own `now`.
    fn scan_horizon_end(now: DateTime<Utc>) -> DateTime<Utc> {
        let month_start = now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive());
        month_start
            .checked_add_months(Months::new(2))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or_else(|| now + Duration::days(62))
    }

    fn candidates(&self, now: DateTime<Utc>) -> Result<Vec<Event>, CoreError> {
        self.source
            .occurrences_between(now, Self::scan_horizon_end(now))
    }

    /// Full evaluation over freshly loaded events; registers everything
    /// the policy pass selects. Skipped occurrences are left untouched.
    pub fn evaluate_now(&mut self, now: DateTime<Utc>) -> Result<Evaluation, CoreError> {
        let candidates = self.candidates(now)?;
        let rules = self.prefs.rules();
        let eval = policy::evaluate(candidates, now, policy::registration_window(), &rules);
        for event in &eval.to_schedule {
            self.scheduler.schedule(event);
        }
        Ok(eval)
    }

    /// Post-load entry point: evaluate immediately and announce the
    /// refreshed state for UI consumers.
    pub fn reload_and_schedule(&mut self, now: DateTime<Utc>) -> Result<Evaluation, CoreError> {
        let eval = self.evaluate_now(now)?;
        self.bus.emit(Signal::EventsUpdated);
        Ok(eval)
    }

    /// Periodic background entry point (hourly on the phone, every 15
    /// minutes on the watch). All state is re-read fresh; failures stop at
    /// this boundary and are reported to the host rather than propagated.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepOutcome {
        match self.evaluate_now(now) {
            Ok(eval) => {
                tracing::info!(
                    scheduled = eval.to_schedule.len(),
                    skipped = eval.to_skip.len(),
                    "scheduling sweep completed"
                );
                SweepOutcome::Completed {
                    scheduled: eval.to_schedule.len(),
                    skipped: eval.to_skip.len(),
                }
            }
            Err(e) => {
                tracing::warn!("scheduling sweep failed: {e}");
                SweepOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Per-event alarm toggle from the UI.
    ///
    /// Disabling records the suppression (occurrence or whole series) and
    /// cancels pending registrations immediately; enabling lifts the
    /// suppression and registers the occurrence if it sits inside the
    /// window right now.
    pub fn on_alarm_toggle(
        &mut self,
        event: &Event,
        enabled: bool,
        whole_series: bool,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if enabled {
            if whole_series {
                self.prefs.enable_series(&event.series_key())?;
            } else {
                self.prefs.enable_instance(&event.instance_key())?;
            }
            let rules = self.prefs.rules();
            let in_window = event.start_time > now
                && event.start_time <= now + policy::registration_window();
            if in_window && rules.allows(event) {
                self.scheduler.schedule(event);
            }
        } else {
            self.scheduler.cancel(event);
            if whole_series {
                self.prefs.disable_series(&event.series_key())?;
                // Sibling occurrences may hold registrations from earlier
                // passes; cancel whatever the provider still lists.
                for sibling in self
                    .candidates(now)?
                    .iter()
                    .filter(|e| e.id == event.id)
                {
                    self.scheduler.cancel(sibling);
                }
            } else {
                self.prefs.disable_instance(&event.instance_key())?;
            }
        }
        Ok(())
    }

    /// Master switch. Disabling cancels the registration of every
    /// in-horizon candidate (older ones have fired or were never
    /// registered); enabling runs a full evaluation pass.
    pub fn on_global_toggle(&mut self, enabled: bool, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.prefs.set_alarms_enabled(enabled)?;
        if enabled {
            self.evaluate_now(now)?;
        } else {
            for event in &self.candidates(now)? {
                self.scheduler.cancel(event);
            }
        }
        Ok(())
    }
}
