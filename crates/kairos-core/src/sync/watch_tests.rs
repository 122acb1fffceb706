use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::calendar::{CacheCalendarSource, CalendarSource};
use crate::signal::{Signal, SignalBus};
use crate::sync::cache::SnapshotCache;
use crate::sync::payload::{EventsSnapshot, SnapshotEvent, EVENTS_PATH};
use crate::sync::watch::WatchSyncListener;

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_723_111_200_000).unwrap()
}

fn snapshot(generated_at: i64, ids: &[i64]) -> EventsSnapshot {
    EventsSnapshot::new(
        generated_at,
        ids.iter()
            .map(|id| SnapshotEvent {
                id: *id,
                title: format!("event {id}"),
                start: (base() + Duration::minutes(*id)).timestamp_millis(),
                recurring: false,
            })
            .collect(),
    )
}

fn listener(dir: &TempDir, bus: SignalBus) -> WatchSyncListener {
    WatchSyncListener::new(SnapshotCache::new(dir.path().join("cache.json")), bus)
}

#[test]
fn receipt_overwrites_the_cache_wholesale() {
    let dir = TempDir::new().unwrap();
    let listener = listener(&dir, SignalBus::new());

    let a = snapshot(1, &[1, 2, 3]).encode().unwrap();
    let b = snapshot(2, &[4]).encode().unwrap();
    assert_eq!(listener.on_data_changed(EVENTS_PATH, &a).unwrap(), Some(3));
    assert_eq!(listener.on_data_changed(EVENTS_PATH, &b).unwrap(), Some(1));

    let loaded = listener.cache().load();
    assert_eq!(loaded.generated_at, 2);
    let ids: Vec<i64> = loaded.events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![4]);
}

#[test]
fn foreign_paths_leave_the_cache_alone() {
    let dir = TempDir::new().unwrap();
    let listener = listener(&dir, SignalBus::new());

    let a = snapshot(1, &[1]).encode().unwrap();
    listener.on_data_changed(EVENTS_PATH, &a).unwrap();

    let result = listener.on_data_changed("/kairos/unrelated", b"junk").unwrap();
    assert_eq!(result, None);
    assert_eq!(listener.cache().load().events.len(), 1);
}

#[test]
fn malformed_payload_clears_rather_than_crashes() {
    let dir = TempDir::new().unwrap();
    let listener = listener(&dir, SignalBus::new());

    listener
        .on_data_changed(EVENTS_PATH, &snapshot(1, &[1, 2]).encode().unwrap())
        .unwrap();
    let result = listener.on_data_changed(EVENTS_PATH, b"%%% not json").unwrap();
    assert_eq!(result, Some(0));
    assert!(listener.cache().load().events.is_empty());

    // Next successful push repairs the cache.
    listener
        .on_data_changed(EVENTS_PATH, &snapshot(3, &[9]).encode().unwrap())
        .unwrap();
    assert_eq!(listener.cache().load().events.len(), 1);
}

#[test]
fn receipt_announces_events_updated() {
    let dir = TempDir::new().unwrap();
    let bus = SignalBus::new();
    let mut rx = bus.subscribe();
    let listener = listener(&dir, bus);

    listener
        .on_data_changed(EVENTS_PATH, &snapshot(1, &[1]).encode().unwrap())
        .unwrap();
    assert!(matches!(rx.try_recv().unwrap(), Signal::EventsUpdated));
}

#[test]
fn cache_source_serves_the_synced_window() {
    let dir = TempDir::new().unwrap();
    let listener = listener(&dir, SignalBus::new());
    listener
        .on_data_changed(EVENTS_PATH, &snapshot(1, &[10, 30, 90]).encode().unwrap())
        .unwrap();

    let source = CacheCalendarSource::new(SnapshotCache::new(dir.path().join("cache.json")));
    assert!(source.permission_granted());
    let events = source
        .occurrences_between(base(), base() + Duration::minutes(60))
        .unwrap();
    let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![10, 30]);
}

#[test]
fn phone_set_suppression_addresses_watch_derived_occurrences() {
    let dir = TempDir::new().unwrap();
    let listener = listener(&dir, SignalBus::new());
    listener
        .on_data_changed(EVENTS_PATH, &snapshot(1, &[10, 30]).encode().unwrap())
        .unwrap();

    // The phone recorded the suppression from its own Event; the watch
    // re-derives the identical identity from the synced record.
    let suppressed = crate::event::occurrence_id(
        10,
        (base() + Duration::minutes(10)).timestamp_millis(),
    );
    let prefs = crate::storage::PrefStore::open(dir.path().join("prefs.toml"));
    prefs.disable_instance(&suppressed.to_string()).unwrap();

    let mut coord = crate::coordinator::AlarmCoordinator::new(
        CacheCalendarSource::new(SnapshotCache::new(dir.path().join("cache.json"))),
        prefs,
        crate::alarm::InProcessAlarms::new(),
        SignalBus::new(),
    );
    let eval = coord.evaluate_now(base()).unwrap();
    let scheduled: Vec<i64> = eval.to_schedule.iter().map(|e| e.id).collect();
    assert_eq!(scheduled, vec![30]);
}

#[test]
fn empty_cache_means_no_watch_candidates() {
    let dir = TempDir::new().unwrap();
    let source = CacheCalendarSource::new(SnapshotCache::new(dir.path().join("missing.json")));
    let events = source
        .occurrences_between(base(), base() + Duration::hours(24))
        .unwrap();
    assert!(events.is_empty());
}
