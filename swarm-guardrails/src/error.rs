use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Fatal guardrail verdicts from the pre-call gate.
///
/// Every message carries the `LIMIT REACHED` tag callers key on to surface
/// a hard stop instead of retrying. Each variant names the budget that
/// tripped and latches the window until the next identity handoff.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitError {
    #[error("LIMIT REACHED: agent '{agent}' is hard-stopped for this window")]
    HardStopLatched { agent: String },

    #[error("LIMIT REACHED: agent '{agent}' exceeded its {limit_minutes} minute duration budget")]
    DurationExceeded { agent: String, limit_minutes: u32 },

    #[error("LIMIT REACHED: agent '{agent}' was idle past its {limit_minutes} minute timeout")]
    IdleTimeout { agent: String, limit_minutes: u32 },

    #[error("LIMIT REACHED: agent '{agent}' used {count} of {limit} tool calls")]
    ToolCallsExhausted { agent: String, limit: u32, count: u32 },

    #[error(
        "LIMIT REACHED: agent '{agent}' repeated '{tool_name}' with identical arguments {occurrences} times"
    )]
    RepetitionLoop {
        agent: String,
        tool_name: String,
        occurrences: usize,
    },

    #[error("LIMIT REACHED: agent '{agent}' hit {count} consecutive tool errors")]
    ConsecutiveErrors { agent: String, count: u32 },
}

/// Advisory budget warning, emitted at most once per window.
///
/// Never interrupts execution; hosts relay the message to the agent so it
/// can wrap up before the hard stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardrailWarning {
    pub agent: String,
    pub tool_calls: u32,
    pub limit: u32,
    pub threshold: f32,
}

impl fmt::Display for GuardrailWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "agent '{}' is approaching its tool-call budget: {} of {} used",
            self.agent, self.tool_calls, self.limit
        )
    }
}
