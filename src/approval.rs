use crate::error::TransportError;
use crate::routine::Routine;
use crate::transport::TransportNegotiator;
use strum::Display;

/// Reminder approval for one routine. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalDecision {
    #[default]
    Unset,
    Approved,
    Rejected,
}

/// What a front end should offer for the current decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalView {
    /// Offer both accept and reject.
    Choices,
    Decided(ApprovalDecision),
}

impl ApprovalView {
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::Choices => None,
            Self::Decided(decision) => Some(format!("You have {decision} email reminders.")),
        }
    }
}

/// Holds a delivered routine, its per-step notify flags and the decision.
#[derive(Debug, Clone)]
pub struct ApprovalMachine {
    goal: String,
    routine: Routine,
    decision: ApprovalDecision,
}

impl ApprovalMachine {
    pub fn new(goal: impl Into<String>, routine: Routine) -> Self {
        Self {
            goal: goal.into(),
            routine,
            decision: ApprovalDecision::Unset,
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn decision(&self) -> ApprovalDecision {
        self.decision
    }

    pub fn view(&self) -> ApprovalView {
        match self.decision {
            ApprovalDecision::Unset => ApprovalView::Choices,
            decided => ApprovalView::Decided(decided),
        }
    }

    /// Out-of-range indices are ignored. The decision is never touched.
    pub fn toggle_notify(&mut self, index: usize, checked: bool) -> bool {
        let applied = self.routine.set_notify(index, checked);
        if !applied {
            tracing::debug!(index, "notify toggle ignored: no such step");
        }
        applied
    }

    /// Record the decision and send it over the duplex channel.
    ///
    /// Only the first call while `Unset` has any effect; later calls return
    /// the existing decision untouched. The decision is recorded even when
    /// the channel is unavailable; that failure is returned for display.
    pub fn decide(
        &mut self,
        approved: bool,
        transport: &TransportNegotiator,
    ) -> Result<ApprovalDecision, TransportError> {
        if self.decision != ApprovalDecision::Unset {
            tracing::debug!(decision = %self.decision, "decision already recorded; ignoring");
            return Ok(self.decision);
        }

        self.decision = if approved {
            ApprovalDecision::Approved
        } else {
            ApprovalDecision::Rejected
        };

        if let Err(e) = transport.send_decision(&self.goal, approved) {
            tracing::warn!(decision = %self.decision, "approval not delivered: {e}");
            return Err(e);
        }
        tracing::info!(decision = %self.decision, "approval sent");
        Ok(self.decision)
    }
}
