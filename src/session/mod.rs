//! Session eligibility: who is signed in and whether their profile allows a
//! goal submission.

pub mod gate;
pub mod local;
pub mod refresher;
pub mod store;
pub mod types;

pub use gate::{Eligibility, IneligibleReason, SessionGate};
pub use local::{LocalAuth, LocalProfiles};
pub use refresher::SessionRefresher;
pub use store::{AuthProvider, ProfileSource, SessionStore};
pub use types::{AuthEvent, Identity, Profile, SessionSnapshot};
