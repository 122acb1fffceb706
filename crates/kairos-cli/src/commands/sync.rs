use chrono::Utc;
use clap::Subcommand;
use kairos_core::alarm::InProcessAlarms;
use kairos_core::calendar::CacheCalendarSource;
use kairos_core::coordinator::{AlarmCoordinator, SweepOutcome};
use kairos_core::signal::SignalBus;
use kairos_core::sync::{
    get_or_create_node_id, LoopbackTransport, PhoneSyncPipeline, WatchSyncListener,
    SYNC_REQUEST_PATH,
};

use crate::common;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Build the next-24h snapshot and push it to the watch cache
    Push,
    /// Simulate the watch requesting one immediate sync
    Request,
    /// Show the cached watch snapshot
    Cache,
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SyncAction::Push => push(false),
        SyncAction::Request => push(true),
        SyncAction::Cache => show_cache(),
    }
}

/// Pushes phone-to-watch over the in-process channel, then runs the watch
/// sweep the receipt would trigger on the device.
fn push(via_request: bool) -> Result<(), Box<dyn std::error::Error>> {
    let node_id = get_or_create_node_id()?;
    let bus = SignalBus::new();
    let listener = WatchSyncListener::new(common::open_cache()?, bus.clone());
    let mut pipeline = PhoneSyncPipeline::new(
        common::open_source()?,
        LoopbackTransport::new(listener),
        bus,
        node_id.clone(),
    );

    let now = Utc::now();
    let count = if via_request {
        pipeline
            .on_message(SYNC_REQUEST_PATH, now)?
            .unwrap_or_default()
    } else {
        pipeline.push(now)?
    };
    println!("pushed {count} occurrence(s) from {node_id}");

    let mut watch = AlarmCoordinator::new(
        CacheCalendarSource::new(common::open_cache()?),
        common::open_prefs()?,
        InProcessAlarms::new(),
        SignalBus::new(),
    );
    match watch.sweep(now) {
        SweepOutcome::Completed { scheduled, skipped } => {
            println!("watch sweep: {scheduled} scheduled, {skipped} skipped");
        }
        SweepOutcome::Failed { reason } => {
            eprintln!("watch sweep failed: {reason}");
        }
    }
    Ok(())
}

fn show_cache() -> Result<(), Box<dyn std::error::Error>> {
    let cache = common::open_cache()?;
    let snapshot = cache.load();
    if snapshot.events.is_empty() {
        println!("watch cache is empty (no sync received yet)");
        return Ok(());
    }

    println!("generated at {} (epoch ms)", snapshot.generated_at);
    for event in snapshot.to_events() {
        println!(
            "  {}  {}  (series {}, occurrence {}{})",
            event.start_time.to_rfc3339(),
            common::display_title(&event.title),
            event.id,
            event.unique_intent_id(),
            if event.is_recurring { ", recurring" } else { "" },
        );
    }
    Ok(())
}
