#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod approval;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routine;
pub mod session;
pub mod transport;

pub use app::AppContext;
pub use approval::{ApprovalDecision, ApprovalMachine, ApprovalView};
pub use config::Config;
pub use error::{PlannerError, Result, RoutinelyError, SubmitError, TransportError};
pub use pipeline::{GoalSubmission, RoutinePipeline, SubmissionState};
pub use routine::{Routine, Step};
