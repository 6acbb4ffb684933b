use thiserror::Error;

use crate::transport::ChannelState;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `routinely`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; glue code (config, CLI) continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum RoutinelyError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Submission ──────────────────────────────────────────────────────
    #[error(transparent)]
    Submit(#[from] SubmitError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error(transparent)]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Transport errors (Path A) ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The duplex channel is not in the `open` state.
    #[error("WebSocket not connected.")]
    Unavailable { state: ChannelState },

    #[error("channel send failed: {0}")]
    Send(String),
}

impl TransportError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } | Self::Send(_) => "transport-unavailable",
        }
    }
}

// ─── Planner errors (Path B) ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Non-2xx response; `detail` is the `{"detail": ..}` body field, verbatim.
    #[error("Failed to generate routine: {}", http_failure_text(.status, .detail.as_deref()))]
    Http { status: u16, detail: Option<String> },

    #[error("Failed to generate routine: {0}")]
    Network(String),

    #[error("No routine generated. Please try a different goal.")]
    EmptyResult,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn http_failure_text(status: &u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => detail.to_string(),
        None => format!("HTTP {status}"),
    }
}

impl PlannerError {
    pub fn reason(&self) -> String {
        match self {
            Self::Http { status, .. } => format!("http-error:{status}"),
            Self::Network(_) => "network-error".to_string(),
            Self::EmptyResult => "empty-result".to_string(),
        }
    }
}

// ─── Submission errors ──────────────────────────────────────────────────────

/// Why a goal submission did not reach (or did not survive) the planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please log in to submit a goal.")]
    NotAuthenticated,

    #[error(
        "Please complete your profile (gender and age) in Account Settings before submitting a goal."
    )]
    ProfileIncomplete,

    #[error("Please enter your goal.")]
    EmptyGoal,

    /// A submission is already waiting on the planner.
    #[error("A routine is already being generated.")]
    InFlight,

    #[error(transparent)]
    Planner(#[from] PlannerError),
}

impl SubmitError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> String {
        match self {
            Self::NotAuthenticated => "not-authenticated".to_string(),
            Self::ProfileIncomplete => "profile-incomplete".to_string(),
            Self::EmptyGoal => "empty-goal".to_string(),
            Self::InFlight => "in-flight".to_string(),
            Self::Planner(err) => err.reason(),
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RoutinelyError>;
