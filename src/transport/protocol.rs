use serde::{Deserialize, Serialize};

/// Frames written to the duplex channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Raw goal text, echoed eagerly on submit.
    Goal { data: String },
    Approval { data: ApprovalPayload },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPayload {
    pub goal: String,
    pub approved: bool,
}

/// Frames read from the duplex channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Routine { data: serde_json::Value },
    Error { data: String },
}

impl ClientMessage {
    pub fn goal(text: impl Into<String>) -> Self {
        Self::Goal { data: text.into() }
    }

    pub fn approval(goal: impl Into<String>, approved: bool) -> Self {
        Self::Approval {
            data: ApprovalPayload {
                goal: goal.into(),
                approved,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Goal { .. } => "goal",
            Self::Approval { .. } => "approval",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","data":"serialization failed"}"#.to_string())
    }
}
