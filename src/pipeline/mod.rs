//! Goal submission lifecycle: validate, mark waiting, send, await, normalize,
//! hand the routine to an [`ApprovalMachine`].

pub mod submission;

pub use submission::GoalSubmission;

use crate::approval::{ApprovalDecision, ApprovalMachine, ApprovalView};
use crate::error::{PlannerError, SubmitError, TransportError};
use crate::routine::{Routine, normalize};
use crate::session::SessionGate;
use crate::transport::TransportNegotiator;
use std::sync::{Arc, Mutex, MutexGuard};
use strum::Display;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Waiting,
    Delivered,
    Failed,
}

#[derive(Default)]
struct PipelineInner {
    state: SubmissionState,
    approval: Option<ApprovalMachine>,
    last_error: Option<SubmitError>,
}

struct Shared {
    inner: Mutex<PipelineInner>,
    state: watch::Sender<SubmissionState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn transition(&self, inner: &mut PipelineInner, next: SubmissionState) {
        tracing::debug!(from = %inner.state, to = %next, "submission state");
        inner.state = next;
        self.state.send_replace(next);
    }

    fn settle(
        &self,
        submission_id: Uuid,
        goal: String,
        outcome: Result<Routine, SubmitError>,
    ) -> Result<Routine, SubmitError> {
        let mut inner = self.lock();
        match outcome {
            Ok(routine) => {
                tracing::info!(
                    %submission_id,
                    steps = routine.steps().len(),
                    "routine delivered"
                );
                inner.approval = Some(ApprovalMachine::new(goal, routine.clone()));
                self.transition(&mut inner, SubmissionState::Delivered);
                Ok(routine)
            }
            Err(e) => {
                tracing::warn!(%submission_id, reason = %e.reason(), "submission failed: {e}");
                inner.last_error = Some(e.clone());
                self.transition(&mut inner, SubmissionState::Failed);
                Err(e)
            }
        }
    }
}

/// Drives one submission at a time from goal text to an approvable routine.
pub struct RoutinePipeline {
    gate: SessionGate,
    transport: TransportNegotiator,
    shared: Arc<Shared>,
}

impl RoutinePipeline {
    pub fn new(gate: SessionGate, transport: TransportNegotiator) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            gate,
            transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(PipelineInner::default()),
                state,
            }),
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn transport(&self) -> &TransportNegotiator {
        &self.transport
    }

    /// Submit `goal` to the planner and wait for the routine.
    ///
    /// Precondition failures return immediately without touching the network
    /// or the state. While a submission is waiting, further calls are
    /// rejected with [`SubmitError::InFlight`]. The planner call runs on its
    /// own task: dropping this future does not cancel it, and its result
    /// still settles the pipeline.
    pub async fn submit(&self, goal: &str) -> Result<Routine, SubmitError> {
        let submission_id = Uuid::new_v4();

        let submission = {
            let mut inner = self.shared.lock();
            if inner.state == SubmissionState::Waiting {
                tracing::debug!(%submission_id, "submission rejected: another is in flight");
                return Err(SubmitError::InFlight);
            }
            let submission = match GoalSubmission::build(goal, &self.gate.snapshot()) {
                Ok(submission) => submission,
                Err(e) => {
                    tracing::debug!(%submission_id, reason = %e.reason(), "submission blocked");
                    inner.last_error = Some(e.clone());
                    return Err(e);
                }
            };
            inner.last_error = None;
            self.shared.transition(&mut inner, SubmissionState::Waiting);
            submission
        };

        if let Err(e) = self.transport.send_goal_raw(goal) {
            tracing::warn!(%submission_id, "goal echo skipped: {e}");
        }

        let transport = self.transport.clone();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let outcome = transport
                .request_routine(&submission)
                .await
                .map_err(SubmitError::from)
                .and_then(|payload| {
                    normalize(payload).ok_or(SubmitError::Planner(PlannerError::EmptyResult))
                });
            shared.settle(submission_id, submission.text, outcome)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => self.shared.settle(
                submission_id,
                String::new(),
                Err(SubmitError::Planner(PlannerError::Network(format!(
                    "planner task failed: {e}"
                )))),
            ),
        }
    }

    pub fn state(&self) -> SubmissionState {
        *self.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.shared.state.subscribe()
    }

    /// Reason the last attempt did not deliver, cleared when a new one starts.
    pub fn last_error(&self) -> Option<SubmitError> {
        self.shared.lock().last_error.clone()
    }

    /// The most recently delivered routine. Kept while a newer submission is
    /// waiting or after it fails.
    pub fn routine(&self) -> Option<Routine> {
        self.shared
            .lock()
            .approval
            .as_ref()
            .map(|a| a.routine().clone())
    }

    pub fn goal(&self) -> Option<String> {
        self.shared
            .lock()
            .approval
            .as_ref()
            .map(|a| a.goal().to_string())
    }

    pub fn decision(&self) -> ApprovalDecision {
        self.shared
            .lock()
            .approval
            .as_ref()
            .map_or(ApprovalDecision::Unset, ApprovalMachine::decision)
    }

    pub fn approval_view(&self) -> Option<ApprovalView> {
        self.shared.lock().approval.as_ref().map(ApprovalMachine::view)
    }

    /// No-op (returns `false`) without a routine or for an out-of-range index.
    pub fn toggle_notify(&self, index: usize, checked: bool) -> bool {
        self.shared
            .lock()
            .approval
            .as_mut()
            .is_some_and(|a| a.toggle_notify(index, checked))
    }

    /// Record and send the approval decision for the current routine.
    /// Returns `Ok(None)` when no routine has been delivered yet.
    pub fn decide(&self, approved: bool) -> Result<Option<ApprovalDecision>, TransportError> {
        let mut inner = self.shared.lock();
        match inner.approval.as_mut() {
            Some(approval) => approval.decide(approved, &self.transport).map(Some),
            None => {
                tracing::debug!("decision ignored: no routine delivered");
                Ok(None)
            }
        }
    }
}
