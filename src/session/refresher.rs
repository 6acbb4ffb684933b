use super::store::{AuthProvider, ProfileSource, SessionStore};
use super::types::SessionSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Keeps a [`SessionStore`] in step with the auth and profile collaborators.
///
/// Recomputation runs on every auth-state notification and on a fixed poll,
/// both through [`SessionRefresher::refresh_once`].
pub struct SessionRefresher {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileSource>,
    store: Arc<SessionStore>,
}

impl SessionRefresher {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileSource>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            auth,
            profiles,
            store,
        }
    }

    /// Fetch identity then profile and publish the result. Idempotent.
    pub async fn refresh_once(&self) -> SessionSnapshot {
        let identity = match self.auth.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Session: identity lookup failed: {e:#}");
                None
            }
        };

        let profile = match &identity {
            Some(identity) => match self.profiles.get_profile(identity).await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!("Session: profile fetch failed: {e:#}");
                    None
                }
            },
            None => None,
        };

        let snapshot = SessionSnapshot { identity, profile };
        if self.store.publish(snapshot.clone()) {
            tracing::debug!(
                authenticated = snapshot.identity.is_some(),
                profile_complete = snapshot.profile_complete(),
                "session snapshot updated"
            );
        }
        snapshot
    }

    /// Run until `cancel` fires. The first poll tick completes immediately, so
    /// the store is populated as soon as the task starts.
    pub fn spawn(self, poll_interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut changes = self.auth.on_auth_state_changed();
            let mut auth_open = true;
            let mut poll = tokio::time::interval(poll_interval);
            poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = poll.tick() => {
                        self.refresh_once().await;
                    }
                    event = changes.recv(), if auth_open => match event {
                        Ok(event) => {
                            tracing::debug!(?event, "auth state changed");
                            self.refresh_once().await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "auth notifications lagged");
                            self.refresh_once().await;
                        }
                        Err(RecvError::Closed) => {
                            tracing::warn!("Session: auth notifications closed; relying on poll");
                            auth_open = false;
                        }
                    },
                }
            }
        })
    }
}
