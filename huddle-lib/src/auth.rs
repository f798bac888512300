//! Sign-in session.
//!
//! Wraps an identity provider's interactive flow and keeps the current
//! identity behind a watch feed: `Some(identity)` on sign-in, `None` on
//! sign-out, delivered in order and at most once per transition.

use chrono::Utc;
use huddle_core::provider::Provider;
use huddle_core::{HuddleError, HuddleResult, Identity, UserProfile};
use tokio::sync::watch;

use crate::store::{LiveStore, paths, to_doc};

pub struct Auth {
    store: LiveStore,
    tx: watch::Sender<Option<Identity>>,
}

impl Auth {
    pub fn new(store: LiveStore) -> Self {
        let (tx, _) = watch::channel(None);
        Auth { store, tx }
    }

    /// Current identity, if signed in.
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Feed of auth transitions. Each receiver observes transitions in
    /// order; intermediate states may be skipped but never duplicated.
    pub fn on_auth_change(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }

    /// Run the provider's interactive sign-in flow.
    ///
    /// A denied or aborted flow is logged and leaves the session signed
    /// out; nothing is retried.
    pub async fn sign_in(&self, provider: &Provider) -> HuddleResult<Identity> {
        let identity = match provider.authenticate().await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::error!(provider = provider.name(), "sign-in failed: {err}");
                return Err(err);
            }
        };
        self.complete_sign_in(identity).await
    }

    /// Record a successful sign-in: provision the profile if this identity
    /// has none yet, then publish the transition.
    pub async fn complete_sign_in(&self, identity: Identity) -> HuddleResult<Identity> {
        self.ensure_profile(&identity).await?;
        tracing::info!(uid = %identity.uid, "signed in");
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Clear the identity. The owning session is expected to drop its
    /// views, which releases every downstream subscription.
    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("signed out");
        }
    }

    /// Create `users/{uid}` exactly once for a first sign-in.
    async fn ensure_profile(&self, identity: &Identity) -> HuddleResult<()> {
        if self.store.get(paths::USERS, &identity.uid).await.is_some() {
            return Ok(());
        }

        let profile = UserProfile::from_identity(identity, Utc::now());
        match self
            .store
            .create(paths::USERS, &identity.uid, to_doc(&profile)?)
            .await
        {
            Ok(()) => Ok(()),
            // Lost the race against a concurrent first sign-in; the
            // profile exists, which is all that matters.
            Err(HuddleError::AlreadyExists(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
