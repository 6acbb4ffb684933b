use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub time: String,
    pub message: String,
    #[serde(default)]
    pub notify: bool,
}

impl Step {
    pub fn new(time: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            message: message.into(),
            notify: false,
        }
    }
}

/// A generated plan: ordered steps, or opaque text when upstream did not send a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Routine {
    Steps(Vec<Step>),
    Text(String),
}

impl Routine {
    pub fn steps(&self) -> &[Step] {
        match self {
            Self::Steps(steps) => steps,
            Self::Text(_) => &[],
        }
    }

    /// Set `notify` on the step at `index`. Returns `false` (and changes
    /// nothing) when the index is out of range or the routine is text.
    pub fn set_notify(&mut self, index: usize, checked: bool) -> bool {
        match self {
            Self::Steps(steps) => match steps.get_mut(index) {
                Some(step) => {
                    step.notify = checked;
                    true
                }
                None => false,
            },
            Self::Text(_) => false,
        }
    }

    /// Indices of steps flagged for notification.
    pub fn notify_indices(&self) -> Vec<usize> {
        self.steps()
            .iter()
            .enumerate()
            .filter_map(|(i, step)| step.notify.then_some(i))
            .collect()
    }

    /// Plain-text table for terminal output.
    pub fn render_table(&self) -> String {
        let steps = match self {
            Self::Text(text) => return text.clone(),
            Self::Steps(steps) => steps,
        };

        let time_width = steps
            .iter()
            .map(|s| s.time.chars().count())
            .chain(std::iter::once("Time".len()))
            .max()
            .unwrap_or(4);
        let message_width = steps
            .iter()
            .map(|s| s.message.chars().count())
            .chain(std::iter::once("Message".len()))
            .max()
            .unwrap_or(7);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "  #  {:<time_width$}  {:<message_width$}  Notify",
            "Time", "Message"
        );
        for (i, step) in steps.iter().enumerate() {
            let mark = if step.notify { "[x]" } else { "[ ]" };
            let _ = writeln!(
                out,
                "{i:>3}  {:<time_width$}  {:<message_width$}  {mark}",
                step.time, step.message
            );
        }
        out
    }
}
