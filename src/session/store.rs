use super::types::{AuthEvent, Identity, Profile, SessionSnapshot};
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{broadcast, watch};

/// Auth/session collaborator contract.
pub trait AuthProvider: Send + Sync {
    fn current_identity<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>>> + Send + 'a>>;

    /// Change notifications. Each call returns an independent subscription.
    fn on_auth_state_changed(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Profile collaborator contract (read side only).
pub trait ProfileSource: Send + Sync {
    fn get_profile<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Profile>>> + Send + 'a>>;
}

/// Observable identity/profile cache.
///
/// Single writer (the refresher), any number of readers via [`SessionStore::subscribe`].
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the cached snapshot. Returns `true` when it actually changed;
    /// unchanged snapshots are not re-announced to subscribers.
    pub fn publish(&self, next: SessionSnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
