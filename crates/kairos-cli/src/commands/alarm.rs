use chrono::Utc;
use clap::Subcommand;
use kairos_core::alarm::{AlertCenter, AlertPhase, InProcessAlarms};
use kairos_core::coordinator::{AlarmCoordinator, SweepOutcome};
use kairos_core::event::Event;
use kairos_core::policy;
use kairos_core::signal::SignalBus;

use crate::common;

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Master alarm switch
    Global {
        /// on | off
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
    /// Turn the alarm off for one occurrence (or its whole series)
    Disable {
        /// Calendar row id
        #[arg(long)]
        event_id: i64,
        /// Occurrence start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Apply to every occurrence of the series
        #[arg(long)]
        series: bool,
    },
    /// Turn the alarm back on for one occurrence (or its whole series)
    Enable {
        /// Calendar row id
        #[arg(long)]
        event_id: i64,
        /// Occurrence start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Apply to every occurrence of the series
        #[arg(long)]
        series: bool,
    },
    /// Run one scheduling sweep and report the outcome
    Sweep,
    /// Sweep, fire due triggers, and walk the alert path to dismissal
    Fire {
        /// Fire triggers due by this instant (RFC 3339); defaults to the
        /// end of the registration window
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AlarmAction::Global { state } => global(state == "on"),
        AlarmAction::Disable {
            event_id,
            start,
            series,
        } => toggle(event_id, &start, series, false),
        AlarmAction::Enable {
            event_id,
            start,
            series,
        } => toggle(event_id, &start, series, true),
        AlarmAction::Sweep => sweep(),
        AlarmAction::Fire { at } => fire(at.as_deref()),
    }
}

fn coordinator() -> Result<AlarmCoordinator<kairos_core::FileCalendarSource, InProcessAlarms>, Box<dyn std::error::Error>>
{
    Ok(AlarmCoordinator::new(
        common::open_source()?,
        common::open_prefs()?,
        InProcessAlarms::new(),
        SignalBus::new(),
    ))
}

fn global(enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut coord = coordinator()?;
    coord.on_global_toggle(enabled, Utc::now())?;
    println!(
        "alarms {} ({} pending in this run)",
        if enabled { "enabled" } else { "disabled" },
        coord.scheduler().backend().pending_count()
    );
    Ok(())
}

fn toggle(
    event_id: i64,
    start: &str,
    series: bool,
    enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = common::parse_start(start)?;
    let event = Event::new(event_id, "", start_time, series);

    let mut coord = coordinator()?;
    coord.on_alarm_toggle(&event, enabled, series, Utc::now())?;

    let prefs = coord.prefs().current();
    if series {
        println!(
            "series {} alarm {} ({} series suppressed)",
            event.series_key(),
            if enabled { "enabled" } else { "disabled" },
            prefs.disabled_series_ids.len()
        );
    } else {
        println!(
            "occurrence {} alarm {} ({} occurrences suppressed)",
            event.instance_key(),
            if enabled { "enabled" } else { "disabled" },
            prefs.disabled_instance_ids.len()
        );
    }
    Ok(())
}

fn sweep() -> Result<(), Box<dyn std::error::Error>> {
    let mut coord = coordinator()?;
    match coord.sweep(Utc::now()) {
        SweepOutcome::Completed { scheduled, skipped } => {
            println!("sweep completed: {scheduled} scheduled, {skipped} skipped");
            for alarm in coord.scheduler().backend().pending().values() {
                println!(
                    "  {} -> {} ({})",
                    alarm.trigger_at.to_rfc3339(),
                    common::display_title(&alarm.payload.event_title),
                    alarm.payload.unique_id,
                );
            }
        }
        SweepOutcome::Failed { reason } => {
            eprintln!("sweep failed: {reason}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn fire(at: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let fire_at = match at {
        Some(value) => common::parse_start(value)?,
        None => now + policy::registration_window(),
    };

    let mut coord = coordinator()?;
    let eval = coord.reload_and_schedule(now)?;
    for event in &eval.to_schedule {
        println!(
            "[{}] {} ({})",
            AlertPhase::Scheduled,
            common::display_title(&event.title),
            event.unique_intent_id()
        );
    }

    let vibrate_only = coord.prefs().current().vibrate_only;
    let bus = SignalBus::new();
    let center = AlertCenter::new(bus);

    let fired = coord.scheduler_mut().backend_mut().tick(fire_at);
    if fired.is_empty() {
        println!("nothing due by {}", fire_at.to_rfc3339());
        return Ok(());
    }

    for payload in fired {
        let unique_id = payload.unique_id;
        let title = payload.event_title.clone();
        println!("[{}] {} ({unique_id})", AlertPhase::Fired, common::display_title(&title));

        let phase = center.on_alarm_fired(payload, vibrate_only, Utc::now());
        println!("[{phase}] {} ({unique_id})", common::display_title(&title));

        // The explicit stop action the user would take on the alert.
        if let Some(phase) = center.dismiss(unique_id) {
            println!("[{phase}] {} ({unique_id})", common::display_title(&title));
        }
    }
    Ok(())
}
