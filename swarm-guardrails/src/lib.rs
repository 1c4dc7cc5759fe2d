//! Runtime guardrail enforcement for swarm agent sessions.
//!
//! The host wires `GuardrailsHooks` into its tool and chat lifecycle:
//! `tool_before` gates each call against the resolved per-agent budgets,
//! `tool_after` feeds outcomes back, and the chat/task hooks drive the
//! delegation state machine. The orchestrator identity is permanently
//! exempt; everything else is accounted per window.

pub mod error;
pub mod hooks;

pub use error::{GuardrailWarning, LimitError};
pub use hooks::{GuardrailsHooks, ToolCallMeta, ToolOutcome};
