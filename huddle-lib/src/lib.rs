//! Engine for the huddle ecosystem.
//!
//! - `store`: live in-process document store with snapshot subscriptions
//!   and atomic write batches
//! - `auth`: sign-in session with first-sign-in provisioning and an
//!   auth-change feed
//! - `friends`: friend search, requests, and symmetric friend edges
//! - `schedule`: events, RSVPs, calendar and peer-availability views
//! - `shell`: the tab container wiring views to store subscriptions

pub mod auth;
pub mod friends;
pub mod schedule;
pub mod shell;
pub mod store;

pub use store::{Document, Filter, LiveStore, Snapshot, Subscription, WriteBatch};
