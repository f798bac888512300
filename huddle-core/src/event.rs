//! Event types and the invariants they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::user::Identity;

/// RSVP status of one attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    Yes,
    No,
    Pending,
}

/// Event priority. Used for presentation only, it carries no scheduling
/// semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// An event document (`events/{id}`).
///
/// Invariants, maintained by [`Event::new`] and [`seed_attendees`]:
/// - the organizer's status is always `Yes`
/// - `attendee_ids` as a set equals the key set of `attendees`
///
/// The organizer owns every field; other attendees may only write their own
/// entry in `attendees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub priority: Priority,
    pub organizer_id: String,
    pub organizer_name: String,
    #[serde(default)]
    pub attendees: BTreeMap<String, RsvpStatus>,
    #[serde(default)]
    pub attendee_ids: Vec<String>,
}

/// The organizer-editable fields of an event, as entered in the event form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub priority: Priority,
}

impl Event {
    /// Build a new event from a draft: the organizer is seeded `Yes`, every
    /// invitee `Pending`. An empty title becomes `"(No Title)"`.
    pub fn new(draft: EventDraft, organizer: &Identity, invitees: &[String]) -> Self {
        let (attendees, attendee_ids) = seed_attendees(&organizer.uid, invitees);

        Event {
            title: if draft.title.is_empty() {
                "(No Title)".to_string()
            } else {
                draft.title
            },
            start: draft.start,
            end: draft.end,
            description: draft.description,
            location: draft.location,
            link: draft.link,
            priority: draft.priority,
            organizer_id: organizer.uid.clone(),
            organizer_name: organizer.name_or_email().to_string(),
            attendees,
            attendee_ids,
        }
    }

    /// Status for a user, defaulting to `Pending` when they have no entry.
    pub fn status_of(&self, uid: &str) -> RsvpStatus {
        self.attendees
            .get(uid)
            .copied()
            .unwrap_or(RsvpStatus::Pending)
    }

    pub fn is_attendee(&self, uid: &str) -> bool {
        self.attendee_ids.iter().any(|id| id == uid)
    }

    pub fn is_organizer(&self, uid: &str) -> bool {
        self.organizer_id == uid
    }

    /// Whether the event shows up on this user's calendar: the organizer
    /// always sees it, everyone else unless they responded `No`.
    pub fn visible_to(&self, uid: &str) -> bool {
        self.is_organizer(uid) || self.status_of(uid) != RsvpStatus::No
    }
}

/// Seed an attendee map for an organizer and their invitees.
///
/// The organizer is always `Yes` and leads the id list; duplicate invitees
/// and the organizer themselves are dropped so the id list always matches
/// the map's key set.
pub fn seed_attendees(
    organizer: &str,
    invitees: &[String],
) -> (BTreeMap<String, RsvpStatus>, Vec<String>) {
    let mut attendees = BTreeMap::new();
    let mut attendee_ids = vec![organizer.to_string()];
    attendees.insert(organizer.to_string(), RsvpStatus::Yes);

    for uid in invitees {
        if uid == organizer || attendees.contains_key(uid) {
            continue;
        }
        attendees.insert(uid.clone(), RsvpStatus::Pending);
        attendee_ids.push(uid.clone());
    }

    (attendees, attendee_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_organizer() -> Identity {
        Identity {
            uid: "org".to_string(),
            email: "org@example.com".to_string(),
            display_name: "Olivia".to_string(),
        }
    }

    fn make_draft() -> EventDraft {
        EventDraft {
            title: "Planning".to_string(),
            start: Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 3, 20, 16, 0, 0).unwrap(),
            description: String::new(),
            location: String::new(),
            link: String::new(),
            priority: Priority::High,
        }
    }

    #[test]
    fn test_new_event_seeds_attendees() {
        let invitees = vec!["x".to_string(), "y".to_string()];
        let event = Event::new(make_draft(), &make_organizer(), &invitees);

        assert_eq!(event.attendee_ids, vec!["org", "x", "y"]);
        assert_eq!(event.status_of("org"), RsvpStatus::Yes);
        assert_eq!(event.status_of("x"), RsvpStatus::Pending);
        assert_eq!(event.status_of("y"), RsvpStatus::Pending);

        let ids: std::collections::BTreeSet<_> = event.attendee_ids.iter().cloned().collect();
        let keys: std::collections::BTreeSet<_> = event.attendees.keys().cloned().collect();
        assert_eq!(ids, keys);
    }

    #[test]
    fn test_empty_title_gets_placeholder() {
        let mut draft = make_draft();
        draft.title.clear();
        let event = Event::new(draft, &make_organizer(), &[]);
        assert_eq!(event.title, "(No Title)");
    }

    #[test]
    fn test_seed_drops_duplicates_and_organizer() {
        let invitees = vec!["x".to_string(), "x".to_string(), "org".to_string()];
        let (attendees, ids) = seed_attendees("org", &invitees);

        assert_eq!(ids, vec!["org", "x"]);
        assert_eq!(attendees.len(), 2);
        assert_eq!(attendees["org"], RsvpStatus::Yes);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let event = Event::new(make_draft(), &make_organizer(), &[]);
        assert_eq!(event.status_of("stranger"), RsvpStatus::Pending);
    }

    #[test]
    fn test_visibility() {
        let invitees = vec!["x".to_string()];
        let mut event = Event::new(make_draft(), &make_organizer(), &invitees);

        assert!(event.visible_to("org"));
        assert!(event.visible_to("x"));

        event.attendees.insert("x".to_string(), RsvpStatus::No);
        assert!(!event.visible_to("x"));
        assert!(event.visible_to("org"));
    }

    #[test]
    fn test_wire_format() {
        let event = Event::new(make_draft(), &make_organizer(), &["x".to_string()]);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["organizerId"], "org");
        assert_eq!(json["organizerName"], "Olivia");
        assert_eq!(json["priority"], "High");
        assert_eq!(json["attendees"]["org"], "Yes");
        assert_eq!(json["attendees"]["x"], "Pending");
        assert_eq!(json["attendeeIds"], serde_json::json!(["org", "x"]));
    }
}
