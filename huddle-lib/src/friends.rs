//! Friends module: user search, friend requests, and symmetric edges.
//!
//! Accepting a request and removing a friend each touch two documents (one
//! edge per direction); both go through a single write batch so the
//! relationship can never be left half-created or half-removed.

use huddle_core::{FriendEdge, FriendRequest, HuddleError, HuddleResult, Identity, UserProfile};
use std::collections::HashSet;

use crate::store::{Filter, LiveStore, Snapshot, Subscription, WriteBatch, paths, to_doc};

/// A friend edge together with the friend's uid (the document id).
#[derive(Debug, Clone, PartialEq)]
pub struct Friend {
    pub uid: String,
    pub edge: FriendEdge,
}

/// A pending friend request together with its document id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: String,
    pub request: FriendRequest,
}

/// Friends operations for one signed-in viewer.
///
/// The viewer identity is passed in explicitly; nothing here reads ambient
/// session state.
pub struct Friends {
    store: LiveStore,
    viewer: Identity,
}

impl Friends {
    pub fn new(store: LiveStore, viewer: Identity) -> Self {
        Friends { store, viewer }
    }

    /// Exact-match user search: by email when the query contains `@`, by
    /// display name otherwise. The viewer and existing friends are
    /// excluded. Results are not deduplicated against outgoing requests,
    /// so re-searching the same target can produce a duplicate request.
    pub async fn search(&self, query: &str) -> HuddleResult<Vec<UserProfile>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let field = if query.contains('@') {
            "email"
        } else {
            "displayName"
        };
        let matches = self
            .store
            .query(paths::USERS, &Filter::eq(field, query))
            .await;

        let friend_ids: HashSet<String> = self
            .store
            .query(&paths::friends_of(&self.viewer.uid), &Filter::All)
            .await
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        Ok(matches
            .into_iter()
            .filter(|doc| doc.id != self.viewer.uid && !friend_ids.contains(&doc.id))
            .filter_map(|doc| doc.parse::<UserProfile>().ok())
            .collect())
    }

    /// Create one friend request towards a user found via [`search`].
    ///
    /// [`search`]: Friends::search
    pub async fn send_request(&self, target: &UserProfile) -> HuddleResult<String> {
        let request = FriendRequest {
            from: self.viewer.uid.clone(),
            to: target.uid.clone(),
            from_name: self.viewer.name_or_email().to_string(),
            to_name: target.name_or_email().to_string(),
        };
        self.store
            .add(paths::FRIEND_REQUESTS, to_doc(&request)?)
            .await
    }

    /// Accept an incoming request: both friend edges and the request
    /// deletion commit as one atomic batch.
    pub async fn accept_request(&self, pending: &PendingRequest) -> HuddleResult<()> {
        let request = &pending.request;
        if request.to != self.viewer.uid {
            return Err(HuddleError::Forbidden(
                "only the recipient can accept a request".into(),
            ));
        }

        let from_name = if request.from_name.is_empty() {
            request.from.clone()
        } else {
            request.from_name.clone()
        };
        let my_edge = FriendEdge::new(from_name);
        let their_edge = FriendEdge::new(self.viewer.name_or_email());

        let batch = WriteBatch::new()
            .set(
                &paths::friends_of(&self.viewer.uid),
                &request.from,
                to_doc(&my_edge)?,
            )
            .set(
                &paths::friends_of(&request.from),
                &self.viewer.uid,
                to_doc(&their_edge)?,
            )
            .delete(paths::FRIEND_REQUESTS, &pending.id);
        self.store.apply(batch).await
    }

    /// Reject an incoming request. No edge is created.
    pub async fn reject_request(&self, pending: &PendingRequest) -> HuddleResult<()> {
        self.store
            .delete(paths::FRIEND_REQUESTS, &pending.id)
            .await
    }

    /// Withdraw an outgoing request before the recipient acts on it.
    pub async fn cancel_request(&self, pending: &PendingRequest) -> HuddleResult<()> {
        self.store
            .delete(paths::FRIEND_REQUESTS, &pending.id)
            .await
    }

    /// Remove a friend: both edge directions are deleted in one batch.
    pub async fn remove_friend(&self, friend_uid: &str) -> HuddleResult<()> {
        let batch = WriteBatch::new()
            .delete(&paths::friends_of(&self.viewer.uid), friend_uid)
            .delete(&paths::friends_of(friend_uid), &self.viewer.uid);
        self.store.apply(batch).await
    }

    /// Look up one pending request by id.
    pub async fn request(&self, id: &str) -> HuddleResult<PendingRequest> {
        let doc = self
            .store
            .get(paths::FRIEND_REQUESTS, id)
            .await
            .ok_or_else(|| HuddleError::NotFound(format!("friendRequests/{id}")))?;
        Ok(PendingRequest {
            id: doc.id.clone(),
            request: doc.parse()?,
        })
    }

    // One-shot reads, used by the HTTP surface.

    pub async fn list(&self) -> Vec<Friend> {
        let snapshot = self
            .store
            .query(&paths::friends_of(&self.viewer.uid), &Filter::All)
            .await;
        friends_from(&snapshot)
    }

    pub async fn incoming(&self) -> Vec<PendingRequest> {
        let snapshot = self
            .store
            .query(
                paths::FRIEND_REQUESTS,
                &Filter::eq("to", self.viewer.uid.as_str()),
            )
            .await;
        requests_from(&snapshot)
    }

    pub async fn outgoing(&self) -> Vec<PendingRequest> {
        let snapshot = self
            .store
            .query(
                paths::FRIEND_REQUESTS,
                &Filter::eq("from", self.viewer.uid.as_str()),
            )
            .await;
        requests_from(&snapshot)
    }

    // Live feeds. Three independent subscriptions; each snapshot fully
    // replaces what the consumer knew before.

    pub async fn friend_feed(&self) -> Subscription {
        self.store
            .subscribe(&paths::friends_of(&self.viewer.uid), Filter::All)
            .await
    }

    pub async fn incoming_feed(&self) -> Subscription {
        self.store
            .subscribe(
                paths::FRIEND_REQUESTS,
                Filter::eq("to", self.viewer.uid.as_str()),
            )
            .await
    }

    pub async fn outgoing_feed(&self) -> Subscription {
        self.store
            .subscribe(
                paths::FRIEND_REQUESTS,
                Filter::eq("from", self.viewer.uid.as_str()),
            )
            .await
    }
}

/// Parse a friends-collection snapshot, skipping malformed documents.
pub fn friends_from(snapshot: &Snapshot) -> Vec<Friend> {
    snapshot
        .iter()
        .filter_map(|doc| {
            Some(Friend {
                uid: doc.id.clone(),
                edge: doc.parse().ok()?,
            })
        })
        .collect()
}

/// Parse a request-collection snapshot, skipping malformed documents.
pub fn requests_from(snapshot: &Snapshot) -> Vec<PendingRequest> {
    snapshot
        .iter()
        .filter_map(|doc| {
            Some(PendingRequest {
                id: doc.id.clone(),
                request: doc.parse().ok()?,
            })
        })
        .collect()
}
