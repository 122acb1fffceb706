use chrono::{Duration, Utc};
use clap::Subcommand;
use kairos_core::calendar::CalendarSource;

use crate::common;

#[derive(Subcommand)]
pub enum EventsAction {
    /// List upcoming occurrences with their alarm eligibility
    List {
        /// Lookahead horizon in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

pub fn run(action: EventsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        EventsAction::List { hours } => list(hours),
    }
}

fn list(hours: i64) -> Result<(), Box<dyn std::error::Error>> {
    let source = common::open_source()?;
    let prefs = common::open_prefs()?;
    let rules = prefs.rules();

    let now = Utc::now();
    let events = source.occurrences_between(now, now + Duration::hours(hours))?;
    if events.is_empty() {
        println!("No upcoming occurrences in the next {hours}h.");
        return Ok(());
    }

    for event in &events {
        let marker = if rules.allows(event) { "on " } else { "off" };
        println!(
            "[alarm {marker}] {}  {}  (series {}, occurrence {})",
            event.start_time.to_rfc3339(),
            common::display_title(&event.title),
            event.id,
            event.unique_intent_id(),
        );
    }
    Ok(())
}
