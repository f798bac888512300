//! Shared types for the huddle ecosystem.
//!
//! This crate provides the types used by both the engine (`huddle-lib`) and
//! the HTTP server (`huddle-server`):
//! - `user`, `friend`, `event` for the data model
//! - `protocol` and `provider` for the identity-provider subprocess protocol
//! - `config` for the global configuration file

pub mod config;
pub mod error;
pub mod event;
pub mod friend;
pub mod protocol;
pub mod provider;
pub mod user;

pub use error::{HuddleError, HuddleResult};
pub use event::{Event, EventDraft, Priority, RsvpStatus, seed_attendees};
pub use friend::{FriendEdge, FriendRequest};
pub use user::{Identity, UserProfile};
