//! Tab shell.
//!
//! The shell owns one view per tab. Selecting a tab mounts its view (which
//! starts the view's subscriptions) the first time; switching away does NOT
//! unmount it, so a mounted tab keeps receiving snapshots in the
//! background. Dropping the shell - on sign-out or session end - drops
//! every view and with them every store subscription.

use huddle_core::Identity;

use crate::friends::{Friend, Friends, PendingRequest, friends_from, requests_from};
use crate::schedule::{AvailabilitySlot, CalendarEntry, Schedule};
use crate::store::{LiveStore, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Calendar,
    ScheduleMeeting,
    Friends,
    Settings,
    Upcoming,
}

/// The calendar tab: every event the viewer organizes or has not declined.
pub struct CalendarView {
    schedule: Schedule,
    feed: Subscription,
    entries: Vec<CalendarEntry>,
}

impl CalendarView {
    async fn mount(store: &LiveStore, viewer: &Identity) -> Self {
        let schedule = Schedule::new(store.clone(), viewer.clone());
        let mut feed = schedule.calendar_feed().await;
        let snapshot = feed.recv().await.unwrap_or_default();
        let entries = schedule.calendar_entries(&snapshot);
        CalendarView {
            schedule,
            feed,
            entries,
        }
    }

    /// Apply any snapshots delivered since the last call.
    pub fn refresh(&mut self) {
        if let Some(snapshot) = self.feed.try_latest() {
            self.entries = self.schedule.calendar_entries(&snapshot);
        }
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    /// Operations (RSVP, delete) run against the same viewer.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

/// The schedule-meeting tab: the viewer's friends, a selection of them,
/// and the combined availability of viewer plus selection.
pub struct ScheduleMeetingView {
    schedule: Schedule,
    friend_feed: Subscription,
    friend_list: Vec<Friend>,
    selected: Vec<String>,
    events_feed: Subscription,
    slots: Vec<AvailabilitySlot>,
}

impl ScheduleMeetingView {
    async fn mount(store: &LiveStore, viewer: &Identity) -> Self {
        let schedule = Schedule::new(store.clone(), viewer.clone());
        let friends = Friends::new(store.clone(), viewer.clone());

        let mut friend_feed = friends.friend_feed().await;
        let friend_list = friends_from(&friend_feed.recv().await.unwrap_or_default());

        let mut events_feed = schedule.availability_feed(&[]).await;
        let snapshot = events_feed.recv().await.unwrap_or_default();
        let slots = schedule.availability_slots(&[], &snapshot);

        ScheduleMeetingView {
            schedule,
            friend_feed,
            friend_list,
            selected: Vec::new(),
            events_feed,
            slots,
        }
    }

    /// Toggle a friend in or out of the availability overlay. The event
    /// feed is re-subscribed for the new selection.
    pub async fn toggle_friend(&mut self, uid: &str) {
        if let Some(position) = self.selected.iter().position(|id| id == uid) {
            self.selected.remove(position);
        } else {
            self.selected.push(uid.to_string());
        }

        self.events_feed = self.schedule.availability_feed(&self.selected).await;
        let snapshot = self.events_feed.recv().await.unwrap_or_default();
        self.slots = self.schedule.availability_slots(&self.selected, &snapshot);
    }

    pub fn refresh(&mut self) {
        if let Some(snapshot) = self.friend_feed.try_latest() {
            self.friend_list = friends_from(&snapshot);
        }
        if let Some(snapshot) = self.events_feed.try_latest() {
            self.slots = self.schedule.availability_slots(&self.selected, &snapshot);
        }
    }

    pub fn friends(&self) -> &[Friend] {
        &self.friend_list
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn slots(&self) -> &[AvailabilitySlot] {
        &self.slots
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

/// The friends tab: friend list plus incoming and outgoing requests, three
/// independent feeds.
pub struct FriendsView {
    friends: Friends,
    friend_feed: Subscription,
    incoming_feed: Subscription,
    outgoing_feed: Subscription,
    friend_list: Vec<Friend>,
    incoming: Vec<PendingRequest>,
    outgoing: Vec<PendingRequest>,
}

impl FriendsView {
    async fn mount(store: &LiveStore, viewer: &Identity) -> Self {
        let friends = Friends::new(store.clone(), viewer.clone());

        let mut friend_feed = friends.friend_feed().await;
        let mut incoming_feed = friends.incoming_feed().await;
        let mut outgoing_feed = friends.outgoing_feed().await;

        let friend_list = friends_from(&friend_feed.recv().await.unwrap_or_default());
        let incoming = requests_from(&incoming_feed.recv().await.unwrap_or_default());
        let outgoing = requests_from(&outgoing_feed.recv().await.unwrap_or_default());

        FriendsView {
            friends,
            friend_feed,
            incoming_feed,
            outgoing_feed,
            friend_list,
            incoming,
            outgoing,
        }
    }

    pub fn refresh(&mut self) {
        if let Some(snapshot) = self.friend_feed.try_latest() {
            self.friend_list = friends_from(&snapshot);
        }
        if let Some(snapshot) = self.incoming_feed.try_latest() {
            self.incoming = requests_from(&snapshot);
        }
        if let Some(snapshot) = self.outgoing_feed.try_latest() {
            self.outgoing = requests_from(&snapshot);
        }
    }

    pub fn friend_list(&self) -> &[Friend] {
        &self.friend_list
    }

    pub fn incoming(&self) -> &[PendingRequest] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[PendingRequest] {
        &self.outgoing
    }

    pub fn friends(&self) -> &Friends {
        &self.friends
    }
}

/// Stub panel: hosts the sign-out control, which is wired through
/// [`Auth`](crate::auth::Auth) rather than the view.
pub struct SettingsView;

/// Stub panel: static placeholder, no data yet.
pub struct UpcomingView;

/// The tab container for one signed-in session.
pub struct Shell {
    store: LiveStore,
    viewer: Identity,
    active: Tab,
    calendar: Option<CalendarView>,
    schedule_meeting: Option<ScheduleMeetingView>,
    friends: Option<FriendsView>,
    settings: Option<SettingsView>,
    upcoming: Option<UpcomingView>,
}

impl Shell {
    /// Open the shell on the calendar tab, the app's landing view.
    pub async fn open(store: LiveStore, viewer: Identity) -> Self {
        let mut shell = Shell {
            store,
            viewer,
            active: Tab::Calendar,
            calendar: None,
            schedule_meeting: None,
            friends: None,
            settings: None,
            upcoming: None,
        };
        shell.select(Tab::Calendar).await;
        shell
    }

    /// Switch tabs, mounting the target's view on first visit. Previously
    /// mounted tabs stay mounted and keep their subscriptions.
    pub async fn select(&mut self, tab: Tab) {
        match tab {
            Tab::Calendar => {
                if self.calendar.is_none() {
                    self.calendar = Some(CalendarView::mount(&self.store, &self.viewer).await);
                }
            }
            Tab::ScheduleMeeting => {
                if self.schedule_meeting.is_none() {
                    self.schedule_meeting =
                        Some(ScheduleMeetingView::mount(&self.store, &self.viewer).await);
                }
            }
            Tab::Friends => {
                if self.friends.is_none() {
                    self.friends = Some(FriendsView::mount(&self.store, &self.viewer).await);
                }
            }
            Tab::Settings => {
                if self.settings.is_none() {
                    self.settings = Some(SettingsView);
                }
            }
            Tab::Upcoming => {
                if self.upcoming.is_none() {
                    self.upcoming = Some(UpcomingView);
                }
            }
        }
        self.active = tab;
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn viewer(&self) -> &Identity {
        &self.viewer
    }

    pub fn calendar(&mut self) -> Option<&mut CalendarView> {
        self.calendar.as_mut()
    }

    pub fn schedule_meeting(&mut self) -> Option<&mut ScheduleMeetingView> {
        self.schedule_meeting.as_mut()
    }

    pub fn friends(&mut self) -> Option<&mut FriendsView> {
        self.friends.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Auth;

    async fn sign_up(store: &LiveStore, uid: &str, name: &str) -> Identity {
        let auth = Auth::new(store.clone());
        auth.complete_sign_in(Identity {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            display_name: name.to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_opens_on_calendar() {
        let store = LiveStore::new();
        let ann = sign_up(&store, "ann", "Ann").await;

        let mut shell = Shell::open(store, ann).await;
        assert_eq!(shell.active(), Tab::Calendar);
        assert!(shell.calendar().is_some());
        assert!(shell.friends().is_none());
    }

    #[tokio::test]
    async fn test_switching_keeps_background_tabs_live() {
        let store = LiveStore::new();
        let ann = sign_up(&store, "ann", "Ann").await;
        let bob = sign_up(&store, "bob", "Bob").await;

        let mut shell = Shell::open(store.clone(), ann.clone()).await;
        shell.select(Tab::Friends).await;
        shell.select(Tab::Calendar).await;
        assert_eq!(shell.active(), Tab::Calendar);

        // A request arrives while the friends tab is in the background.
        let as_bob = Friends::new(store.clone(), bob);
        let ann_profile = as_bob.search("Ann").await.unwrap();
        as_bob.send_request(&ann_profile[0]).await.unwrap();

        let friends_view = shell.friends().unwrap();
        friends_view.refresh();
        assert_eq!(friends_view.incoming().len(), 1);
        assert_eq!(friends_view.incoming()[0].request.from, "bob");
    }

    #[tokio::test]
    async fn test_calendar_view_tracks_events() {
        let store = LiveStore::new();
        let ann = sign_up(&store, "ann", "Ann").await;
        let bob = sign_up(&store, "bob", "Bob").await;

        let mut shell = Shell::open(store.clone(), ann).await;
        assert!(shell.calendar().unwrap().entries().is_empty());

        let bobs_schedule = Schedule::new(store.clone(), bob);
        bobs_schedule
            .create_event(
                huddle_core::EventDraft {
                    title: "Lunch".to_string(),
                    start: chrono::Utc::now(),
                    end: chrono::Utc::now(),
                    description: String::new(),
                    location: String::new(),
                    link: String::new(),
                    priority: Default::default(),
                },
                &["ann".to_string()],
            )
            .await
            .unwrap();

        let calendar = shell.calendar().unwrap();
        calendar.refresh();
        assert_eq!(calendar.entries().len(), 1);
        assert_eq!(calendar.entries()[0].event.title, "Lunch");
    }

    #[tokio::test]
    async fn test_toggle_friend_rescopes_availability() {
        let store = LiveStore::new();
        let ann = sign_up(&store, "ann", "Ann").await;
        sign_up(&store, "bob", "Bob").await;

        let bobs_schedule = Schedule::new(
            store.clone(),
            Identity {
                uid: "bob".to_string(),
                email: "bob@example.com".to_string(),
                display_name: "Bob".to_string(),
            },
        );
        bobs_schedule
            .create_event(
                huddle_core::EventDraft {
                    title: "Dentist".to_string(),
                    start: chrono::Utc::now(),
                    end: chrono::Utc::now(),
                    description: String::new(),
                    location: String::new(),
                    link: String::new(),
                    priority: Default::default(),
                },
                &[],
            )
            .await
            .unwrap();

        let mut shell = Shell::open(store, ann).await;
        shell.select(Tab::ScheduleMeeting).await;

        let view = shell.schedule_meeting().unwrap();
        assert!(view.slots().is_empty());

        view.toggle_friend("bob").await;
        assert_eq!(view.slots().len(), 1);
        assert!(matches!(view.slots()[0], AvailabilitySlot::Busy { .. }));

        view.toggle_friend("bob").await;
        assert!(view.slots().is_empty());
    }
}
