use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated identity as reported by the auth collaborator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    /// Opaque session token. Never logged.
    #[serde(skip_serializing)]
    pub token: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub gender: Option<String>,
    pub age: Option<u32>,
}

impl Profile {
    /// Both required fields are present.
    pub fn is_complete(&self) -> bool {
        self.gender.is_some() && self.age.is_some()
    }
}

/// Cached view of the current session, published by [`super::SessionStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
}

impl SessionSnapshot {
    pub fn profile_complete(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_complete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}
