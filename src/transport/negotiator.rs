use super::channel::GoalChannel;
use super::planner::RoutinePlanner;
use super::protocol::ClientMessage;
use crate::error::{PlannerError, TransportError};
use crate::pipeline::GoalSubmission;
use std::sync::Arc;

/// Routes each datum to the path that carries it.
///
/// The duplex channel takes the eager goal echo and the approval decision;
/// the planner call is the only source of routines. Only this type writes to
/// the channel.
#[derive(Clone)]
pub struct TransportNegotiator {
    channel: Arc<dyn GoalChannel>,
    planner: Arc<dyn RoutinePlanner>,
}

impl TransportNegotiator {
    pub fn new(channel: Arc<dyn GoalChannel>, planner: Arc<dyn RoutinePlanner>) -> Self {
        Self { channel, planner }
    }

    /// Best-effort echo of the raw goal text.
    pub fn send_goal_raw(&self, text: &str) -> Result<(), TransportError> {
        self.channel.send(ClientMessage::goal(text))
    }

    pub async fn request_routine(
        &self,
        submission: &GoalSubmission,
    ) -> Result<serde_json::Value, PlannerError> {
        self.planner.request_routine(submission).await
    }

    /// Fire-and-forget; no acknowledgment is awaited.
    pub fn send_decision(&self, goal: &str, approved: bool) -> Result<(), TransportError> {
        self.channel.send(ClientMessage::approval(goal, approved))
    }
}
