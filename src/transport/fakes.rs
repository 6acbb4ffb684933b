//! Test doubles for the two transport paths.

use super::channel::{ChannelState, GoalChannel};
use super::planner::RoutinePlanner;
use super::protocol::ClientMessage;
use crate::error::{PlannerError, TransportError};
use crate::pipeline::GoalSubmission;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub(crate) struct RecordingChannel {
    state: Mutex<ChannelState>,
    sent: Mutex<Vec<ClientMessage>>,
}

impl RecordingChannel {
    pub(crate) fn open() -> Self {
        Self::with_state(ChannelState::Open)
    }

    pub(crate) fn with_state(state: ChannelState) -> Self {
        Self {
            state: Mutex::new(state),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_state(&self, state: ChannelState) {
        *self.state.lock().unwrap() = state;
    }

    pub(crate) fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl GoalChannel for RecordingChannel {
    fn state(&self) -> ChannelState {
        *self.state.lock().unwrap()
    }

    fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        let state = self.state();
        if state != ChannelState::Open {
            return Err(TransportError::Unavailable { state });
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Replays canned planner results in order; optionally blocks each call
/// until [`ScriptedPlanner::release`].
pub(crate) struct ScriptedPlanner {
    responses: Mutex<VecDeque<Result<serde_json::Value, PlannerError>>>,
    requests: Mutex<Vec<GoalSubmission>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedPlanner {
    pub(crate) fn new(responses: Vec<Result<serde_json::Value, PlannerError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub(crate) fn held(responses: Vec<Result<serde_json::Value, PlannerError>>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(responses)
        }
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<GoalSubmission> {
        self.requests.lock().unwrap().clone()
    }
}

impl RoutinePlanner for ScriptedPlanner {
    fn request_routine<'a>(
        &'a self,
        submission: &'a GoalSubmission,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, PlannerError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(submission.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(PlannerError::EmptyResult))
        })
    }
}
