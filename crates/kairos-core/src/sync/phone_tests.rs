use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use crate::calendar::{FileCalendarSource, OccurrenceRow};
use crate::error::{CoreError, SyncError};
use crate::signal::{Signal, SignalBus};
use crate::sync::cache::SnapshotCache;
use crate::sync::debounce::Clock;
use crate::sync::payload::SYNC_REQUEST_PATH;
use crate::sync::phone::PhoneSyncPipeline;
use crate::sync::transport::{LoopbackTransport, SyncTransport};
use crate::sync::watch::WatchSyncListener;

#[derive(Clone)]
struct FakeClock(Arc<AtomicI64>);

impl FakeClock {
    fn at(millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(millis)))
    }

    fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0.load(Ordering::SeqCst)).unwrap()
    }
}

struct FailingTransport;

impl SyncTransport for FailingTransport {
    fn put(&mut self, _path: &str, _body: &[u8]) -> Result<(), SyncError> {
        Err(SyncError::Transport("node unreachable".into()))
    }
}

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_723_111_200_000).unwrap()
}

fn source_with(dir: &TempDir, offsets_min: &[(i64, i64)]) -> FileCalendarSource {
    let rows: Vec<OccurrenceRow> = offsets_min
        .iter()
        .map(|(id, offset)| OccurrenceRow {
            id: *id,
            title: format!("event {id}"),
            begin: (base() + Duration::minutes(*offset)).timestamp_millis(),
            recurring: false,
        })
        .collect();
    let path = dir.path().join("calendar.json");
    std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();
    FileCalendarSource::new(path)
}

fn pipeline_over(
    dir: &TempDir,
    offsets_min: &[(i64, i64)],
    clock: FakeClock,
) -> (
    PhoneSyncPipeline<FileCalendarSource, LoopbackTransport, FakeClock>,
    SnapshotCache,
    SignalBus,
) {
    let source = source_with(dir, offsets_min);
    let cache_path = dir.path().join("watch-cache.json");
    let bus = SignalBus::new();
    let listener = WatchSyncListener::new(SnapshotCache::new(&cache_path), bus.clone());
    let transport = LoopbackTransport::new(listener);
    let pipeline = PhoneSyncPipeline::with_clock(
        source,
        transport,
        bus.clone(),
        "kairos-test-node".into(),
        clock,
    );
    (pipeline, SnapshotCache::new(&cache_path), bus)
}

#[test]
fn push_replicates_only_the_next_24h() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(base().timestamp_millis());
    let (mut pipeline, cache, _bus) =
        pipeline_over(&dir, &[(1, 30), (2, 23 * 60), (3, 25 * 60)], clock);

    let count = pipeline.push(base()).unwrap();
    assert_eq!(count, 2);

    let ids: Vec<i64> = cache.load().events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(cache.load().generated_at, base().timestamp_millis());
}

#[test]
fn pull_request_triggers_an_immediate_push() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(base().timestamp_millis());
    let (mut pipeline, cache, _bus) = pipeline_over(&dir, &[(1, 30)], clock);

    let pushed = pipeline.on_message(SYNC_REQUEST_PATH, base()).unwrap();
    assert_eq!(pushed, Some(1));
    assert_eq!(cache.load().events.len(), 1);
}

#[test]
fn foreign_messages_are_ignored() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(base().timestamp_millis());
    let (mut pipeline, cache, _bus) = pipeline_over(&dir, &[(1, 30)], clock);

    let pushed = pipeline.on_message("/kairos/unrelated", base()).unwrap();
    assert_eq!(pushed, None);
    assert!(cache.load().events.is_empty());
}

#[test]
fn calendar_change_bursts_coalesce_into_one_push() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(base().timestamp_millis());
    let (mut pipeline, cache, _bus) = pipeline_over(&dir, &[(1, 30)], clock.clone());

    pipeline.on_calendar_changed();
    pipeline.on_calendar_changed();
    pipeline.on_calendar_changed();
    assert_eq!(pipeline.poll(clock.now()).unwrap(), None);

    clock.advance(3_000);
    assert_eq!(pipeline.poll(clock.now()).unwrap(), Some(1));
    assert_eq!(cache.load().events.len(), 1);

    // The burst is spent; nothing further fires.
    clock.advance(60_000);
    assert_eq!(pipeline.poll(clock.now()).unwrap(), None);
}

#[test]
fn push_announces_on_the_bus() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(base().timestamp_millis());
    let (mut pipeline, _cache, bus) = pipeline_over(&dir, &[(1, 30)], clock);
    let mut rx = bus.subscribe();

    pipeline.push(base()).unwrap();

    // Cache overwrite announces first (loopback delivery), then the push.
    assert!(matches!(rx.try_recv().unwrap(), Signal::EventsUpdated));
    assert!(matches!(
        rx.try_recv().unwrap(),
        Signal::SyncPushed { generated_at } if generated_at == base().timestamp_millis()
    ));
}

#[test]
fn transport_failure_is_a_retryable_sync_error() {
    let dir = TempDir::new().unwrap();
    let source = source_with(&dir, &[(1, 30)]);
    let mut pipeline = PhoneSyncPipeline::new(
        source,
        FailingTransport,
        SignalBus::new(),
        "kairos-test-node".into(),
    );

    let err = pipeline.push(base()).unwrap_err();
    match err {
        CoreError::Sync(sync_err) => assert!(sync_err.is_retryable()),
        other => panic!("expected sync error, got {other}"),
    }
}

#[test]
fn permission_gap_replicates_an_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    let source = FileCalendarSource::with_permission(dir.path().join("calendar.json"), false);
    let cache_path = dir.path().join("watch-cache.json");
    let bus = SignalBus::new();
    let listener = WatchSyncListener::new(SnapshotCache::new(&cache_path), bus.clone());
    let mut pipeline = PhoneSyncPipeline::new(
        source,
        LoopbackTransport::new(listener),
        bus,
        "kairos-test-node".into(),
    );

    assert_eq!(pipeline.push(base()).unwrap(), 0);
    let cache = SnapshotCache::new(&cache_path);
    assert!(cache.load().events.is_empty());
    assert_eq!(cache.load().generated_at, base().timestamp_millis());
}
