//! In-process collaborators used by the CLI and by tests.

use super::store::{AuthProvider, ProfileSource};
use super::types::{AuthEvent, Identity, Profile};
use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

const AUTH_EVENT_BUFFER: usize = 16;

/// Auth collaborator holding a single locally-configured identity.
pub struct LocalAuth {
    identity: watch::Sender<Option<Identity>>,
    events: broadcast::Sender<AuthEvent>,
}

impl LocalAuth {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        let (events, _) = broadcast::channel(AUTH_EVENT_BUFFER);
        Self { identity, events }
    }

    pub fn with_identity(identity: Identity) -> Self {
        let auth = Self::new();
        auth.identity.send_replace(Some(identity));
        auth
    }

    pub fn sign_in(&self, identity: Identity) {
        self.identity.send_replace(Some(identity));
        let _ = self.events.send(AuthEvent::SignedIn);
    }

    pub fn sign_out(&self) {
        self.identity.send_replace(None);
        let _ = self.events.send(AuthEvent::SignedOut);
    }

    /// Swap the session token without changing who is signed in.
    pub fn refresh_token(&self, token: String) {
        let changed = self.identity.send_if_modified(|current| match current {
            Some(identity) => {
                identity.token = token;
                true
            }
            None => false,
        });
        if changed {
            let _ = self.events.send(AuthEvent::TokenRefreshed);
        }
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for LocalAuth {
    fn current_identity<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>>> + Send + 'a>> {
        let identity = self.identity.borrow().clone();
        Box::pin(async move { Ok(identity) })
    }

    fn on_auth_state_changed(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// Profile rows keyed by identity id.
#[derive(Default)]
pub struct LocalProfiles {
    rows: Mutex<HashMap<String, Profile>>,
}

impl LocalProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, identity_id: &str, profile: Profile) {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(identity_id.to_string(), profile);
    }
}

impl ProfileSource for LocalProfiles {
    fn get_profile<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Profile>>> + Send + 'a>> {
        let profile = self
            .rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&identity.id)
            .cloned();
        Box::pin(async move { Ok(profile) })
    }
}
