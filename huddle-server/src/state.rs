use std::sync::Arc;

use huddle_core::config::HuddleConfig;
use huddle_core::{HuddleError, HuddleResult, Identity};
use huddle_lib::auth::Auth;
use huddle_lib::store::LiveStore;

/// Shared application state: one store and one sign-in session.
///
/// The server is a local companion process for a GUI client, so it carries
/// a single session, like the popup-based sign-in it replaces.
#[derive(Clone)]
pub struct AppState {
    pub config: HuddleConfig,
    pub store: LiveStore,
    pub auth: Arc<Auth>,
}

impl AppState {
    pub fn new(config: HuddleConfig) -> Self {
        let store = LiveStore::new();
        let auth = Arc::new(Auth::new(store.clone()));
        AppState {
            config,
            store,
            auth,
        }
    }

    /// The signed-in viewer, passed explicitly into every module that
    /// needs it.
    pub fn viewer(&self) -> HuddleResult<Identity> {
        self.auth.current().ok_or(HuddleError::SignedOut)
    }
}
