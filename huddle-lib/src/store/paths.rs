//! Collection paths used by the app.

pub const USERS: &str = "users";
pub const FRIEND_REQUESTS: &str = "friendRequests";
pub const EVENTS: &str = "events";

/// Per-user friends subcollection, `users/{uid}/friends`.
pub fn friends_of(uid: &str) -> String {
    format!("users/{uid}/friends")
}
