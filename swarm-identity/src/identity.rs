use crate::names::{self, AgentKind};

/// The resolved identity behind a raw agent name.
///
/// Classification is total: every raw name maps to exactly one variant, so
/// callers pattern-match instead of comparing sentinel strings. Only the
/// orchestrator is exempt from guardrail accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The top-level coordinating identity (or a recognized swarm alias of it).
    Orchestrator,
    /// A recognized subagent type, possibly reached through a swarm prefix.
    Known(AgentKind),
    /// Any other name. Gated with base-config budgets; never exempt.
    Unrecognized(String),
}

impl Identity {
    /// Classify a raw (possibly prefixed, possibly oddly-cased) agent name.
    pub fn of(raw_name: &str) -> Identity {
        let normalized = names::normalize(raw_name);
        let kind = AgentKind::from_name(names::strip_swarm_prefix(&normalized));
        match kind {
            Some(AgentKind::Architect) => Identity::Orchestrator,
            Some(other) => Identity::Known(other),
            None => Identity::Unrecognized(normalized),
        }
    }

    pub fn is_orchestrator(&self) -> bool {
        matches!(self, Identity::Orchestrator)
    }

    /// True for every identity that is subject to guardrail windows.
    pub fn is_subagent(&self) -> bool {
        !self.is_orchestrator()
    }
}
