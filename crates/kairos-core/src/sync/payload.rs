//! Wire schema for phone-to-watch replication.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::event::Event;

/// Data path carrying the 24-hour snapshot; replace-semantics per path.
pub const EVENTS_PATH: &str = "/kairos/events24h";
/// Watch-to-phone message requesting one immediate sync. No body.
pub const SYNC_REQUEST_PATH: &str = "/kairos/request-sync";

/// One replicated occurrence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Occurrence start, epoch milliseconds.
    pub start: i64,
    #[serde(default)]
    pub recurring: bool,
}

impl From<&Event> for SnapshotEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            start: event.start_millis(),
            recurring: event.is_recurring,
        }
    }
}

impl SnapshotEvent {
    /// Back to the domain model. `None` for out-of-range timestamps,
    /// which a well-formed peer never produces.
    pub fn to_event(&self) -> Option<Event> {
        let start_time = chrono::DateTime::from_timestamp_millis(self.start)?;
        Some(Event::new(self.id, self.title.clone(), start_time, self.recurring))
    }
}

/// Whole-list snapshot pushed as one atomic payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsSnapshot {
    /// Generation timestamp, epoch milliseconds.
    pub generated_at: i64,
    #[serde(default)]
    pub events: Vec<SnapshotEvent>,
}

impl EventsSnapshot {
    pub fn new(generated_at: i64, events: Vec<SnapshotEvent>) -> Self {
        Self {
            generated_at,
            events,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        serde_json::to_vec(self).map_err(SyncError::Encode)
    }

    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Malformed payloads read as empty, never as a crash: a corrupt cache
    /// or push self-heals on the next successful sync.
    pub fn decode_or_empty(body: &[u8]) -> Self {
        Self::decode(body).unwrap_or_else(|e| {
            tracing::warn!("malformed events snapshot, treating as empty: {e}");
            Self::default()
        })
    }

    /// Domain events, skipping records a well-formed peer never produces.
    pub fn to_events(&self) -> Vec<Event> {
        self.events.iter().filter_map(SnapshotEvent::to_event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn snapshot() -> EventsSnapshot {
        EventsSnapshot::new(
            1_723_111_200_000,
            vec![
                SnapshotEvent {
                    id: 1,
                    title: "Standup".into(),
                    start: 1_723_113_000_000,
                    recurring: true,
                },
                SnapshotEvent {
                    id: 2,
                    title: String::new(),
                    start: 1_723_120_000_000,
                    recurring: false,
                },
            ],
        )
    }

    #[test]
    fn wire_field_names_are_fixed() {
        // Both ends of the channel parse by these exact names.
        let body = snapshot().encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("generatedAt").is_some());
        let first = &json["events"][0];
        assert!(first.get("id").is_some());
        assert!(first.get("title").is_some());
        assert!(first.get("start").is_some());
        assert!(first.get("recurring").is_some());
    }

    #[test]
    fn decode_restores_the_payload() {
        let original = snapshot();
        let decoded = EventsSnapshot::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn malformed_body_reads_as_empty() {
        let decoded = EventsSnapshot::decode_or_empty(b"{\"generatedAt\": \"oops\"}");
        assert_eq!(decoded, EventsSnapshot::default());
        assert!(EventsSnapshot::decode_or_empty(b"garbage").events.is_empty());
    }

    #[test]
    fn to_events_rederives_occurrence_identity() {
        // The watch re-derives identities from synced fields, so a
        // phone-suppressed occurrence stays addressable here.
        let events = snapshot().to_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].unique_intent_id(),
            crate::event::occurrence_id(1, 1_723_113_000_000)
        );
        assert_eq!(
            events[0].start_time,
            DateTime::from_timestamp_millis(1_723_113_000_000).unwrap()
        );
    }
}
