use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::pipeline::GoalSubmission;
use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

const GENERATE_ROUTINE_PATH: &str = "generate-routine";

/// Request/response seam for routine generation.
pub trait RoutinePlanner: Send + Sync {
    /// Returns the raw `routine` field of a successful response.
    fn request_routine<'a>(
        &'a self,
        submission: &'a GoalSubmission,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, PlannerError>> + Send + 'a>>;
}

#[derive(Debug, Deserialize)]
struct RoutineResponse {
    #[serde(default)]
    routine: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub fn build_planner_client(config: &PlannerConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// HTTP client for `POST /generate-routine`.
pub struct PlannerClient {
    client: Client,
    endpoint: Url,
}

impl PlannerClient {
    pub fn new(config: &PlannerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_planner_client(config),
            endpoint: routine_endpoint(&config.base_url)?,
        })
    }

    async fn post(&self, submission: &GoalSubmission) -> Result<serde_json::Value, PlannerError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await
            .map_err(|e| PlannerError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(PlannerError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        match resp.json::<RoutineResponse>().await {
            Ok(body) => Ok(body.routine),
            Err(e) => {
                tracing::debug!("Planner: undecodable success body: {e}");
                Err(PlannerError::EmptyResult)
            }
        }
    }
}

impl RoutinePlanner for PlannerClient {
    fn request_routine<'a>(
        &'a self,
        submission: &'a GoalSubmission,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, PlannerError>> + Send + 'a>> {
        Box::pin(self.post(submission))
    }
}

/// `<base>/generate-routine`, tolerating a trailing slash or a path prefix on `base`.
pub fn routine_endpoint(base_url: &str) -> anyhow::Result<Url> {
    let mut base = Url::parse(base_url)
        .with_context(|| format!("invalid planner base URL `{base_url}`"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(GENERATE_ROUTINE_PATH)
        .context("build routine endpoint URL")
}
