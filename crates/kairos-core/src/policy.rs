//! Alarm scheduling decision pass.
//!
//! A pure recompute: given candidate occurrences, the current preference
//! state and a window re-derived from `now`, decide which occurrences need
//! a pending alarm right now. No memory of earlier passes is kept --
//! schedule calls are idempotent, so repeating a decision is harmless.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::event::Event;

/// Immediate-registration lookahead. Occurrences further out are picked up
/// by a later sweep once the window slides forward.
pub fn registration_window() -> Duration {
    Duration::minutes(75)
}

/// The alarm-relevant slice of preference state, snapshotted per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRules {
    /// Master switch for event alarms.
    pub global_enabled: bool,
    /// Occurrence identities suppressed individually.
    pub disabled_instances: BTreeSet<String>,
    /// Series ids suppressed for every occurrence, past and future.
    pub disabled_series: BTreeSet<String>,
}

impl Default for AlarmRules {
    fn default() -> Self {
        Self {
            global_enabled: true,
            disabled_instances: BTreeSet::new(),
            disabled_series: BTreeSet::new(),
        }
    }
}

impl AlarmRules {
    /// Effective alarm-eligibility of one occurrence, ignoring the window:
    /// enabled globally, not instance-suppressed, and not series-suppressed
    /// (series suppression only binds recurring occurrences).
    pub fn allows(&self, event: &Event) -> bool {
        self.global_enabled
            && !self.disabled_instances.contains(&event.instance_key())
            && !(event.is_recurring && self.disabled_series.contains(&event.series_key()))
    }
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Eligible and inside the registration window right now.
    pub to_schedule: Vec<Event>,
    /// Everything else. Skipped occurrences are left alone, never
    /// cancelled: cancellation is driven by explicit toggles only, so a
    /// registration from an earlier, wider pass survives the window
    /// sliding past it.
    pub to_skip: Vec<Event>,
}

/// Full recompute of which candidates need a pending alarm right now.
///
/// The window is `(now, now + window]` -- exclusive lower bound, so an
/// occurrence starting at or before `now` is never freshly scheduled and a
/// passed alarm cannot re-fire. Duplicate identities in `candidates` pass
/// through untouched; the caller either deduplicates or accepts redundant
/// idempotent schedule calls.
pub fn evaluate(
    candidates: Vec<Event>,
    now: DateTime<Utc>,
    window: Duration,
    rules: &AlarmRules,
) -> Evaluation {
    if !rules.global_enabled {
        // The caller owns cancelling anything registered earlier.
        return Evaluation {
            to_schedule: Vec::new(),
            to_skip: candidates,
        };
    }

    let deadline = now + window;
    let mut eval = Evaluation::default();
    for event in candidates {
        let in_window = event.start_time > now && event.start_time <= deadline;
        if in_window && rules.allows(&event) {
            eval.to_schedule.push(event);
        } else {
            eval.to_skip.push(event);
        }
    }
    eval
}
