//! Calendar source boundary: read-only occurrence queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CoreError;
use crate::event::Event;
use crate::sync::SnapshotCache;

/// Read-only boundary to a device calendar provider.
///
/// Implementations query raw occurrence rows for a time range. A missing
/// read permission is state, not failure: queries degrade to an empty
/// list. The range convention is `from <= start_time < to`; the policy
/// pass applies its own registration window on top.
pub trait CalendarSource: Send + Sync {
    /// Whether the runtime read permission is currently granted.
    fn permission_granted(&self) -> bool;

    /// Occurrences starting inside `[from, to)`, ordered by start.
    fn occurrences_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, CoreError>;
}

/// One raw provider row as stored in the calendar file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceRow {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Occurrence begin, epoch milliseconds.
    pub begin: i64,
    #[serde(default)]
    pub recurring: bool,
}

impl OccurrenceRow {
    fn to_event(&self) -> Option<Event> {
        let start_time = DateTime::from_timestamp_millis(self.begin)?;
        Some(Event::new(self.id, self.title.clone(), start_time, self.recurring))
    }
}

/// File-backed calendar source: a JSON array of [`OccurrenceRow`]s.
///
/// Stands in for the device calendar provider on the CLI host; the
/// `permission` flag keeps the degraded no-grant path testable.
pub struct FileCalendarSource {
    path: PathBuf,
    permission: bool,
}

impl FileCalendarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            permission: true,
        }
    }

    pub fn with_permission(path: impl Into<PathBuf>, granted: bool) -> Self {
        Self {
            path: path.into(),
            permission: granted,
        }
    }
}

impl CalendarSource for FileCalendarSource {
    fn permission_granted(&self) -> bool {
        self.permission
    }

    fn occurrences_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, CoreError> {
        if !self.permission {
            return Ok(Vec::new());
        }
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let rows: Vec<OccurrenceRow> = serde_json::from_str(&content)
            .map_err(|e| CoreError::Calendar(format!("unreadable calendar file: {e}")))?;

        let mut events: Vec<Event> = rows
            .iter()
            .filter_map(OccurrenceRow::to_event)
            .filter(|e| e.start_time >= from && e.start_time < to)
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }
}

/// Watch-side calendar source reading the synced snapshot cache, so the
/// watch runs the identical policy and scheduler stack against replicated
/// data. Cache reads need no runtime grant.
pub struct CacheCalendarSource {
    cache: SnapshotCache,
}

impl CacheCalendarSource {
    pub fn new(cache: SnapshotCache) -> Self {
        Self { cache }
    }
}

impl CalendarSource for CacheCalendarSource {
    fn permission_granted(&self) -> bool {
        true
    }

    fn occurrences_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, CoreError> {
        let mut events: Vec<Event> = self
            .cache
            .events()
            .into_iter()
            .filter(|e| e.start_time >= from && e.start_time < to)
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }
}
