//! Friend edges and friend requests.

use serde::{Deserialize, Serialize};

/// A friend edge document (`users/{owner}/friends/{friendUid}`).
///
/// `friend_name` is a display-name snapshot taken when the request was
/// accepted. `nickname` is an optional per-owner override that wins over the
/// snapshot when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendEdge {
    pub friend_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl FriendEdge {
    pub fn new(friend_name: impl Into<String>) -> Self {
        FriendEdge {
            friend_name: friend_name.into(),
            nickname: None,
        }
    }

    /// Label to show for this friend: nickname, then name snapshot.
    pub fn display_name(&self) -> &str {
        match &self.nickname {
            Some(nickname) if !nickname.is_empty() => nickname,
            _ if !self.friend_name.is_empty() => &self.friend_name,
            _ => "Unnamed",
        }
    }
}

/// A pending friend request (`friendRequests/{id}`).
///
/// A transient intent record: created by the sender, deleted on acceptance,
/// rejection or cancellation, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub to_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_precedence() {
        let mut edge = FriendEdge::new("Bob");
        assert_eq!(edge.display_name(), "Bob");

        edge.nickname = Some("Bobby".to_string());
        assert_eq!(edge.display_name(), "Bobby");

        edge.nickname = None;
        edge.friend_name.clear();
        assert_eq!(edge.display_name(), "Unnamed");
    }

    #[test]
    fn test_edge_wire_format() {
        let edge = FriendEdge::new("Bob");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json, serde_json::json!({ "friendName": "Bob" }));
    }

    #[test]
    fn test_request_wire_format() {
        let request = FriendRequest {
            from: "a".to_string(),
            to: "b".to_string(),
            from_name: "Ann".to_string(),
            to_name: "Bob".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fromName"], "Ann");
        assert_eq!(json["toName"], "Bob");
    }
}
