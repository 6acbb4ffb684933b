use crate::config::{AccountConfig, Config};
use crate::pipeline::RoutinePipeline;
use crate::session::{
    Identity, LocalAuth, LocalProfiles, Profile, SessionGate, SessionRefresher, SessionStore,
};
use crate::transport::{DuplexChannel, GoalChannel, PlannerClient, TransportNegotiator};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything one front end needs: session refresh running, channel opened,
/// pipeline wired to both transport paths.
pub struct AppContext {
    pub config: Arc<Config>,
    pub auth: Arc<LocalAuth>,
    pub profiles: Arc<LocalProfiles>,
    pub store: Arc<SessionStore>,
    pub channel: Arc<DuplexChannel>,
    pub pipeline: RoutinePipeline,
    cancel: CancellationToken,
    refresher: JoinHandle<()>,
}

impl AppContext {
    /// Must be called inside a Tokio runtime. The session snapshot is
    /// populated before this returns; the channel may still be connecting.
    pub async fn start(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let identity = local_identity(&config.account);
        let profiles = Arc::new(LocalProfiles::new());
        if let Some(identity) = &identity {
            profiles.upsert(
                &identity.id,
                Profile {
                    gender: config.profile.gender.clone(),
                    age: config.profile.age,
                },
            );
        }
        let auth = Arc::new(identity.map_or_else(LocalAuth::new, LocalAuth::with_identity));

        let store = Arc::new(SessionStore::new());
        let refresher = SessionRefresher::new(
            Arc::clone(&auth) as _,
            Arc::clone(&profiles) as _,
            Arc::clone(&store),
        );
        refresher.refresh_once().await;

        let cancel = CancellationToken::new();
        let refresher = refresher.spawn(
            Duration::from_millis(config.session.poll_interval_ms),
            cancel.clone(),
        );

        let planner = Arc::new(PlannerClient::new(&config.planner)?);
        let channel = Arc::new(DuplexChannel::open(&config.channel.url));
        let transport =
            TransportNegotiator::new(Arc::clone(&channel) as Arc<dyn GoalChannel>, planner);
        let pipeline = RoutinePipeline::new(SessionGate::new(store.subscribe()), transport);

        tracing::debug!(
            planner = %config.planner.base_url,
            channel = %config.channel.url,
            "app context started"
        );

        Ok(Self {
            config,
            auth,
            profiles,
            store,
            channel,
            pipeline,
            cancel,
            refresher,
        })
    }

    /// Stop the refresher and close the channel, flushing any frame the
    /// pipeline has already handed to it.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.channel
            .close_and_flush(Duration::from_secs(self.config.channel.open_timeout_secs))
            .await;
        if let Err(e) = self.refresher.await {
            tracing::warn!("session refresher ended abnormally: {e}");
        }
    }
}

/// Identity from `[account]`; absent unless an email is configured.
pub fn local_identity(account: &AccountConfig) -> Option<Identity> {
    let email = account.email.clone().filter(|e| !e.trim().is_empty())?;
    Some(Identity {
        id: account.user_id.clone().unwrap_or_else(|| email.clone()),
        email,
        token: account.token.clone().unwrap_or_default(),
    })
}
