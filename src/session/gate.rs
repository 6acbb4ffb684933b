use super::types::{Identity, SessionSnapshot};
use crate::error::SubmitError;
use strum::{Display, IntoStaticStr};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum IneligibleReason {
    NotAuthenticated,
    ProfileIncomplete,
}

impl From<IneligibleReason> for SubmitError {
    fn from(reason: IneligibleReason) -> Self {
        match reason {
            IneligibleReason::NotAuthenticated => Self::NotAuthenticated,
            IneligibleReason::ProfileIncomplete => Self::ProfileIncomplete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub can_submit: bool,
    pub reason: Option<IneligibleReason>,
}

impl Eligibility {
    fn eligible() -> Self {
        Self {
            can_submit: true,
            reason: None,
        }
    }

    fn blocked(reason: IneligibleReason) -> Self {
        Self {
            can_submit: false,
            reason: Some(reason),
        }
    }
}

/// Read-only eligibility view over a [`super::SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionGate {
    session: watch::Receiver<SessionSnapshot>,
}

impl SessionGate {
    pub fn new(session: watch::Receiver<SessionSnapshot>) -> Self {
        Self { session }
    }

    pub fn current_eligibility(&self) -> Eligibility {
        evaluate(&self.session.borrow())
    }

    /// Identity and profile as one consistent read.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.borrow().identity.clone()
    }
}

pub fn evaluate(snapshot: &SessionSnapshot) -> Eligibility {
    if snapshot.identity.is_none() {
        Eligibility::blocked(IneligibleReason::NotAuthenticated)
    } else if !snapshot.profile_complete() {
        Eligibility::blocked(IneligibleReason::ProfileIncomplete)
    } else {
        Eligibility::eligible()
    }
}
