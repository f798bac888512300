//! Schedule module: events, RSVPs, and the two event views.
//!
//! The calendar view shows everything the viewer organizes or has not
//! declined. The availability view overlays selected friends' events; for
//! events the viewer does not attend it exposes a busy block only - the
//! [`AvailabilitySlot::Busy`] variant has no fields for a title,
//! description, location, link or attendee list, so third-party event
//! content cannot leak through it.

use chrono::{DateTime, Utc};
use huddle_core::{
    Event, EventDraft, HuddleError, HuddleResult, Identity, Priority, RsvpStatus, seed_attendees,
};
use serde::Serialize;
use serde_json::Map;

use crate::store::{Document, Filter, LiveStore, Snapshot, Subscription, paths, to_doc};

/// One event as it appears on the viewer's calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    #[serde(flatten)]
    pub event: Event,
    pub my_status: RsvpStatus,
    pub is_creator: bool,
}

impl CalendarEntry {
    /// Presentation tags, matching the stylesheet classes of the calendar
    /// widget. No further semantics.
    pub fn style_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        classes.push(match self.event.priority {
            Priority::High => "priority-high",
            Priority::Medium => "priority-medium",
            Priority::Low => "priority-low",
        });
        if self.my_status == RsvpStatus::Pending {
            classes.push("pending-event");
        }
        classes
    }
}

/// One slot on the shared availability view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AvailabilitySlot {
    /// An event the viewer attends, with full content.
    Event(CalendarEntry),
    /// A friend's event the viewer does not attend: timing only.
    Busy {
        id: String,
        title: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl AvailabilitySlot {
    fn busy(doc_id: &str, event: &Event) -> Self {
        AvailabilitySlot::Busy {
            id: doc_id.to_string(),
            title: "Busy".to_string(),
            start: event.start,
            end: event.end,
        }
    }

    pub fn style_classes(&self) -> Vec<&'static str> {
        match self {
            AvailabilitySlot::Event(entry) => entry.style_classes(),
            AvailabilitySlot::Busy { .. } => vec!["friend-busy"],
        }
    }
}

/// Event operations and views for one signed-in viewer.
pub struct Schedule {
    store: LiveStore,
    viewer: Identity,
}

impl Schedule {
    pub fn new(store: LiveStore, viewer: Identity) -> Self {
        Schedule { store, viewer }
    }

    /// Create an event: the viewer becomes the organizer with status `Yes`,
    /// every invitee starts `Pending`.
    pub async fn create_event(
        &self,
        draft: EventDraft,
        invitees: &[String],
    ) -> HuddleResult<String> {
        let event = Event::new(draft, &self.viewer, invitees);
        self.store.add(paths::EVENTS, to_doc(&event)?).await
    }

    /// Rewrite an event's fields and invitee set. Organizer only.
    ///
    /// The attendee map is re-seeded wholesale, so every non-organizer RSVP
    /// resets to `Pending` - even when the invitee set did not change. That
    /// matches the shipped behavior; whether it is intended is an open
    /// product question (see DESIGN.md), so it is preserved as-is.
    pub async fn edit_event(
        &self,
        id: &str,
        draft: EventDraft,
        invitees: &[String],
    ) -> HuddleResult<()> {
        let existing = self.fetch(id).await?;
        if !existing.is_organizer(&self.viewer.uid) {
            return Err(HuddleError::Forbidden(
                "only the organizer can edit an event".into(),
            ));
        }

        let (attendees, attendee_ids) = seed_attendees(&self.viewer.uid, invitees);

        let mut fields = Map::new();
        fields.insert("title".to_string(), to_doc(&draft.title)?);
        fields.insert("start".to_string(), to_doc(&draft.start)?);
        fields.insert("end".to_string(), to_doc(&draft.end)?);
        fields.insert("description".to_string(), to_doc(&draft.description)?);
        fields.insert("location".to_string(), to_doc(&draft.location)?);
        fields.insert("link".to_string(), to_doc(&draft.link)?);
        fields.insert("priority".to_string(), to_doc(&draft.priority)?);
        fields.insert("attendees".to_string(), to_doc(&attendees)?);
        fields.insert("attendeeIds".to_string(), to_doc(&attendee_ids)?);

        self.store.update(paths::EVENTS, id, fields).await
    }

    /// Record the viewer's RSVP. Only their own entry in the attendee map
    /// is written; `attendeeIds` is untouched.
    pub async fn respond(&self, id: &str, status: RsvpStatus) -> HuddleResult<()> {
        let existing = self.fetch(id).await?;
        if existing.is_organizer(&self.viewer.uid) {
            return Err(HuddleError::Forbidden(
                "the organizer's status is fixed to Yes".into(),
            ));
        }
        if !existing.is_attendee(&self.viewer.uid) {
            return Err(HuddleError::Forbidden(
                "not an attendee of this event".into(),
            ));
        }

        let mut fields = Map::new();
        fields.insert(format!("attendees.{}", self.viewer.uid), to_doc(&status)?);
        self.store.update(paths::EVENTS, id, fields).await
    }

    /// Delete an event for everyone. Organizer only.
    pub async fn delete_event(&self, id: &str) -> HuddleResult<()> {
        let existing = self.fetch(id).await?;
        if !existing.is_organizer(&self.viewer.uid) {
            return Err(HuddleError::Forbidden(
                "only the organizer can delete an event".into(),
            ));
        }
        self.store.delete(paths::EVENTS, id).await
    }

    async fn fetch(&self, id: &str) -> HuddleResult<Event> {
        self.store
            .get(paths::EVENTS, id)
            .await
            .ok_or_else(|| HuddleError::NotFound(format!("events/{id}")))?
            .parse()
    }

    // Calendar view

    /// Live feed backing the calendar view; map snapshots with
    /// [`calendar_entries`](Schedule::calendar_entries).
    pub async fn calendar_feed(&self) -> Subscription {
        self.store.subscribe(paths::EVENTS, Filter::All).await
    }

    /// One-shot calendar view.
    pub async fn calendar_now(&self) -> Vec<CalendarEntry> {
        let snapshot = self.store.query(paths::EVENTS, &Filter::All).await;
        self.calendar_entries(&snapshot)
    }

    /// Entries visible on the viewer's calendar: everything they organize,
    /// plus everything they have not declined.
    pub fn calendar_entries(&self, snapshot: &Snapshot) -> Vec<CalendarEntry> {
        snapshot
            .iter()
            .filter_map(|doc| self.entry_of(doc))
            .filter(|entry| entry.is_creator || entry.my_status != RsvpStatus::No)
            .collect()
    }

    // Availability view

    /// Live feed for the availability view over the viewer plus the
    /// selected friends. Changing the selection means subscribing anew.
    pub async fn availability_feed(&self, selected_friends: &[String]) -> Subscription {
        self.store
            .subscribe(paths::EVENTS, self.availability_filter(selected_friends))
            .await
    }

    /// One-shot availability view.
    pub async fn availability_now(&self, selected_friends: &[String]) -> Vec<AvailabilitySlot> {
        let snapshot = self
            .store
            .query(paths::EVENTS, &self.availability_filter(selected_friends))
            .await;
        self.availability_slots(selected_friends, &snapshot)
    }

    fn availability_filter(&self, selected_friends: &[String]) -> Filter {
        let mut ids = vec![self.viewer.uid.clone()];
        ids.extend(selected_friends.iter().cloned());
        Filter::contains_any("attendeeIds", ids)
    }

    /// Map an availability snapshot into slots. Events the viewer attends
    /// keep their content; the rest are reduced to busy blocks.
    pub fn availability_slots(
        &self,
        selected_friends: &[String],
        snapshot: &Snapshot,
    ) -> Vec<AvailabilitySlot> {
        snapshot
            .iter()
            .filter_map(|doc| {
                let event: Event = doc.parse().ok()?;
                if event.is_attendee(&self.viewer.uid) {
                    self.entry_of(doc).map(AvailabilitySlot::Event)
                } else if selected_friends.iter().any(|uid| event.is_attendee(uid)) {
                    Some(AvailabilitySlot::busy(&doc.id, &event))
                } else {
                    None
                }
            })
            .collect()
    }

    fn entry_of(&self, doc: &Document) -> Option<CalendarEntry> {
        let event: Event = doc.parse().ok()?;
        let my_status = event.status_of(&self.viewer.uid);
        let is_creator = event.is_organizer(&self.viewer.uid);
        Some(CalendarEntry {
            id: doc.id.clone(),
            event,
            my_status,
            is_creator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_identity(uid: &str, name: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            display_name: name.to_string(),
        }
    }

    fn make_draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 3, 20, 16, 0, 0).unwrap(),
            description: "agenda".to_string(),
            location: "room 1".to_string(),
            link: "https://example.com/call".to_string(),
            priority: Priority::High,
        }
    }

    fn schedule_for(store: &LiveStore, uid: &str) -> Schedule {
        Schedule::new(store.clone(), make_identity(uid, ""))
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let invitees = vec!["x".to_string(), "y".to_string()];

        let id = organizer
            .create_event(make_draft("Standup"), &invitees)
            .await
            .unwrap();

        let event: Event = store
            .get(paths::EVENTS, &id)
            .await
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(event.title, "Standup");
        assert_eq!(event.attendee_ids, vec!["org", "x", "y"]);
        assert_eq!(event.status_of("org"), RsvpStatus::Yes);
        assert_eq!(event.status_of("x"), RsvpStatus::Pending);
        assert_eq!(event.status_of("y"), RsvpStatus::Pending);
    }

    #[tokio::test]
    async fn test_respond_touches_only_own_status() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let invitees = vec!["x".to_string(), "y".to_string()];
        let id = organizer
            .create_event(make_draft("Standup"), &invitees)
            .await
            .unwrap();

        let as_x = schedule_for(&store, "x");
        as_x.respond(&id, RsvpStatus::Yes).await.unwrap();

        let event: Event = store
            .get(paths::EVENTS, &id)
            .await
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(event.status_of("x"), RsvpStatus::Yes);
        assert_eq!(event.status_of("y"), RsvpStatus::Pending);
        assert_eq!(event.attendee_ids, vec!["org", "x", "y"]);
    }

    #[tokio::test]
    async fn test_respond_guards() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let id = organizer
            .create_event(make_draft("Standup"), &["x".to_string()])
            .await
            .unwrap();

        let err = organizer.respond(&id, RsvpStatus::No).await.unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));

        let stranger = schedule_for(&store, "stranger");
        let err = stranger.respond(&id, RsvpStatus::Yes).await.unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_edit_resets_rsvps_even_for_unchanged_invitees() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let invitees = vec!["x".to_string(), "y".to_string()];
        let id = organizer
            .create_event(make_draft("Standup"), &invitees)
            .await
            .unwrap();

        schedule_for(&store, "x")
            .respond(&id, RsvpStatus::Yes)
            .await
            .unwrap();

        // Organizer changes only the location, same invitee set.
        let mut draft = make_draft("Standup");
        draft.location = "room 2".to_string();
        organizer.edit_event(&id, draft, &invitees).await.unwrap();

        let event: Event = store
            .get(paths::EVENTS, &id)
            .await
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(event.location, "room 2");
        // x's earlier Yes is gone.
        assert_eq!(event.status_of("x"), RsvpStatus::Pending);
        assert_eq!(event.status_of("org"), RsvpStatus::Yes);
    }

    #[tokio::test]
    async fn test_edit_and_delete_are_organizer_only() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let id = organizer
            .create_event(make_draft("Standup"), &["x".to_string()])
            .await
            .unwrap();

        let as_x = schedule_for(&store, "x");
        let err = as_x
            .edit_event(&id, make_draft("Hijacked"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));

        let err = as_x.delete_event(&id).await.unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));

        organizer.delete_event(&id).await.unwrap();
        assert!(store.get(paths::EVENTS, &id).await.is_none());
    }

    #[tokio::test]
    async fn test_declined_event_leaves_only_that_calendar() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let invitees = vec!["x".to_string(), "y".to_string()];
        let id = organizer
            .create_event(make_draft("Standup"), &invitees)
            .await
            .unwrap();

        let as_x = schedule_for(&store, "x");
        as_x.respond(&id, RsvpStatus::No).await.unwrap();

        assert!(as_x.calendar_now().await.is_empty());
        assert_eq!(organizer.calendar_now().await.len(), 1);
        assert_eq!(schedule_for(&store, "y").calendar_now().await.len(), 1);
    }

    #[tokio::test]
    async fn test_busy_blocks_carry_timing_only() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "friend");
        organizer
            .create_event(make_draft("Secret planning"), &[])
            .await
            .unwrap();

        let viewer = schedule_for(&store, "me");
        let selected = vec!["friend".to_string()];
        let slots = viewer.availability_now(&selected).await;
        assert_eq!(slots.len(), 1);

        match &slots[0] {
            AvailabilitySlot::Busy { title, start, end, .. } => {
                assert_eq!(title, "Busy");
                assert_eq!(*start, Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap());
                assert_eq!(*end, Utc.with_ymd_and_hms(2025, 3, 20, 16, 0, 0).unwrap());
            }
            other => panic!("expected a busy block, got {other:?}"),
        }

        // The serialized form must not leak event content either.
        let json = serde_json::to_string(&slots[0]).unwrap();
        assert!(!json.contains("Secret"));
        assert!(!json.contains("room 1"));
        assert!(!json.contains("example.com/call"));
        assert!(!json.contains("attendees"));
        assert_eq!(slots[0].style_classes(), vec!["friend-busy"]);
    }

    #[tokio::test]
    async fn test_availability_keeps_own_events_full() {
        let store = LiveStore::new();
        let friend = schedule_for(&store, "friend");
        friend
            .create_event(make_draft("Shared sync"), &["me".to_string()])
            .await
            .unwrap();

        let viewer = schedule_for(&store, "me");
        let slots = viewer.availability_now(&["friend".to_string()]).await;
        assert_eq!(slots.len(), 1);
        match &slots[0] {
            AvailabilitySlot::Event(entry) => {
                assert_eq!(entry.event.title, "Shared sync");
                assert_eq!(entry.my_status, RsvpStatus::Pending);
                assert!(!entry.is_creator);
            }
            other => panic!("expected a full entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_availability_excludes_unselected_strangers() {
        let store = LiveStore::new();
        schedule_for(&store, "stranger")
            .create_event(make_draft("Their thing"), &[])
            .await
            .unwrap();

        let viewer = schedule_for(&store, "me");
        assert!(viewer.availability_now(&["friend".to_string()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_style_classes() {
        let store = LiveStore::new();
        let organizer = schedule_for(&store, "org");
        let id = organizer
            .create_event(make_draft("Standup"), &["x".to_string()])
            .await
            .unwrap();

        let entries = organizer.calendar_now().await;
        assert_eq!(entries[0].style_classes(), vec!["priority-high"]);

        let as_x = schedule_for(&store, "x");
        let entries = as_x.calendar_now().await;
        assert_eq!(
            entries[0].style_classes(),
            vec!["priority-high", "pending-event"]
        );
        let _ = id;
    }
}
