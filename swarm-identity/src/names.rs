use serde::{Deserialize, Serialize};

/// Name of the top-level coordinating identity. Permanently exempt from
/// guardrail windows.
pub const ORCHESTRATOR_NAME: &str = "architect";

/// Sentinel recorded when a session is created without an agent name.
/// Distinct from every recognized identity so it is gated like any other
/// unrecognized subagent, never silently treated as the orchestrator.
pub const UNATTRIBUTED_AGENT: &str = "unattributed";

/// The closed set of recognized base agent types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Architect,
    Coder,
    TestEngineer,
    Explorer,
    Reviewer,
    Critic,
    Sme,
    Docs,
    Designer,
}

impl AgentKind {
    pub const ALL: [AgentKind; 9] = [
        AgentKind::Architect,
        AgentKind::Coder,
        AgentKind::TestEngineer,
        AgentKind::Explorer,
        AgentKind::Reviewer,
        AgentKind::Critic,
        AgentKind::Sme,
        AgentKind::Docs,
        AgentKind::Designer,
    ];

    /// Canonical (normalized) name for this agent type.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Architect => "architect",
            AgentKind::Coder => "coder",
            AgentKind::TestEngineer => "test_engineer",
            AgentKind::Explorer => "explorer",
            AgentKind::Reviewer => "reviewer",
            AgentKind::Critic => "critic",
            AgentKind::Sme => "sme",
            AgentKind::Docs => "docs",
            AgentKind::Designer => "designer",
        }
    }

    /// Look up an agent type by its exact normalized name.
    pub fn from_name(name: &str) -> Option<AgentKind> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Normalize a raw agent name: lowercase, hyphens and spaces become
/// underscores, surrounding whitespace is dropped.
pub fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Strip a leading `<token>_` swarm prefix from a normalized name.
///
/// Stripping happens only when the remainder exactly matches a known base
/// agent name at an underscore boundary. Whole-suffix match only:
/// `mega_architect` resolves to `architect`, while `architectural`,
/// `architects`, and `megaarchitect` pass through unchanged.
pub fn strip_swarm_prefix(normalized: &str) -> &str {
    for kind in AgentKind::ALL {
        let base = kind.as_str();
        if let Some(head) = normalized.strip_suffix(base) {
            if let Some(token) = head.strip_suffix('_') {
                if !token.is_empty() {
                    return base;
                }
            }
        }
    }
    normalized
}
