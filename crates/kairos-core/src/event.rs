//! Calendar occurrence model and the derived occurrence identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete calendar occurrence (not a series).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Calendar row id. Shared by every occurrence of a recurring series.
    pub id: i64,
    /// Display title; may be empty upstream.
    #[serde(default)]
    pub title: String,
    /// Occurrence start.
    pub start_time: DateTime<Utc>,
    /// Whether the occurrence belongs to a repeating series.
    #[serde(default)]
    pub is_recurring: bool,
}

impl Event {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        is_recurring: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start_time,
            is_recurring,
        }
    }

    /// Occurrence start as epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.start_time.timestamp_millis()
    }

    /// Stable occurrence identity used for alarm addressing and
    /// per-instance suppression. See [`occurrence_id`].
    pub fn unique_intent_id(&self) -> i32 {
        occurrence_id(self.id, self.start_millis())
    }

    /// Occurrence identity rendered as stored in the per-instance
    /// suppression set.
    pub fn instance_key(&self) -> String {
        self.unique_intent_id().to_string()
    }

    /// Series identity rendered as stored in the per-series suppression set.
    pub fn series_key(&self) -> String {
        self.id.to_string()
    }
}

/// Derives the 32-bit occurrence identity from `(calendar_id, start_millis)`.
///
/// Phone and watch compute this independently from synced fields, so the
/// derivation must stay byte-for-byte stable across releases and devices:
/// the two decimal renderings are concatenated and folded with the
/// 31-multiplier polynomial string hash, wrapping in `i32`. Equal inputs
/// always agree; distinct inputs are extremely likely, not guaranteed, to
/// differ.
pub fn occurrence_id(calendar_id: i64, start_millis: i64) -> i32 {
    let key = format!("{calendar_id}{start_millis}");
    key.bytes()
        .fold(0i32, |h, b| h.wrapping_mul(31).wrapping_add(b as i32))
}
