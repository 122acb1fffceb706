//! Shared wiring for CLI commands.
//!
//! The CLI plays both devices in one process: the phone side reads the
//! calendar file in the data directory, the watch side reads the snapshot
//! cache that `sync push` fills.

use std::error::Error;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use kairos_core::calendar::FileCalendarSource;
use kairos_core::storage::{data_dir, PrefStore};
use kairos_core::sync::SnapshotCache;

/// JSON array of occurrence rows standing in for the device provider.
pub const CALENDAR_FILE: &str = "calendar.json";

pub fn calendar_path() -> Result<PathBuf, Box<dyn Error>> {
    Ok(data_dir()?.join(CALENDAR_FILE))
}

pub fn open_source() -> Result<FileCalendarSource, Box<dyn Error>> {
    Ok(FileCalendarSource::new(calendar_path()?))
}

pub fn open_prefs() -> Result<PrefStore, Box<dyn Error>> {
    Ok(PrefStore::open_default()?)
}

pub fn open_cache() -> Result<SnapshotCache, Box<dyn Error>> {
    Ok(SnapshotCache::open_default()?)
}

/// Occurrence starts are given as RFC 3339 (e.g. 2026-08-08T10:00:00Z).
pub fn parse_start(value: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| format!("invalid start time '{value}': {e}"))?
        .with_timezone(&Utc))
}

pub fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "(untitled)"
    } else {
        title
    }
}
