use crate::error::SubmitError;
use crate::session::SessionSnapshot;
use crate::session::gate::evaluate;
use serde::Serialize;

/// One goal submission attempt, serialized as the planner request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalSubmission {
    #[serde(rename = "goal")]
    pub text: String,
    #[serde(rename = "email")]
    pub identity_email: String,
    pub gender: String,
    pub age: u32,
}

impl GoalSubmission {
    /// Validate in order: signed in, profile complete, non-blank goal.
    /// The first failing check wins.
    pub fn build(goal: &str, session: &SessionSnapshot) -> Result<Self, SubmitError> {
        if let Some(reason) = evaluate(session).reason {
            return Err(reason.into());
        }
        let (Some(identity), Some(profile)) = (&session.identity, &session.profile) else {
            return Err(SubmitError::NotAuthenticated);
        };
        let (Some(gender), Some(age)) = (&profile.gender, profile.age) else {
            return Err(SubmitError::ProfileIncomplete);
        };

        let text = goal.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyGoal);
        }

        Ok(Self {
            text: text.to_string(),
            identity_email: identity.email.clone(),
            gender: gender.clone(),
            age,
        })
    }
}
