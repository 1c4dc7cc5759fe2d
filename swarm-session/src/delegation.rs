use chrono::{DateTime, Utc};
use swarm_identity::{Identity, ORCHESTRATOR_NAME, names};

use crate::store::{AgentSession, SessionStateStore};

/// State machine over `{orchestrator, subagent(name)}` driven by chat
/// messages and task-tool completions.
///
/// Stateless itself; all state lives in the store so the hooks layer owns a
/// single source of truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelegationTracker;

impl DelegationTracker {
    /// Apply a chat-message signal.
    ///
    /// A missing or empty `agent`, or any orchestrator alias, hands the
    /// session back to the architect; anything else delegates to that
    /// subagent. A signal naming the identity that already holds the
    /// session is a no-op, so repeated messages from the same speaker do
    /// not reset its counters.
    pub fn on_chat_message(
        store: &mut SessionStateStore,
        session_id: &str,
        agent: Option<&str>,
        now: DateTime<Utc>,
    ) {
        Self::recover_if_stale(store, session_id, now);

        let signal = agent.map(str::trim).filter(|name| !name.is_empty());
        let target = match signal {
            Some(name) if Identity::of(name).is_subagent() => name,
            // Missing, empty, or an orchestrator alias (case/separator
            // variants and swarm prefixes included).
            _ => ORCHESTRATOR_NAME,
        };

        let current = store
            .get_agent_session(session_id)
            .map(|session| names::normalize(&session.agent_name));
        if current.as_deref() == Some(names::normalize(target).as_str()) {
            return;
        }
        store.start_agent_session(session_id, target, now);
    }

    /// A task tool finished: the delegated subagent is done, so control
    /// returns to the architect immediately rather than waiting for the
    /// next chat-message signal.
    pub fn on_task_tool_complete(
        store: &mut SessionStateStore,
        session_id: &str,
        now: DateTime<Utc>,
    ) {
        let is_orchestrator = store
            .get_agent_session(session_id)
            .is_some_and(|session| session.identity().is_orchestrator());
        if is_orchestrator {
            return;
        }
        if store.get_agent_session(session_id).is_some() {
            store.start_agent_session(session_id, ORCHESTRATOR_NAME, now);
            tracing::debug!(session_id, "task tool completed, control returned to architect");
        }
    }

    /// A session is stale when delegation has been marked over but the
    /// record still names a subagent. Judged purely on the identity and
    /// delegation flag, never on tool recency.
    pub fn is_stale(session: &AgentSession) -> bool {
        !session.delegation_active && session.identity().is_subagent()
    }

    /// Reset a stale session to the architect. Returns whether a recovery
    /// happened.
    pub fn recover_if_stale(
        store: &mut SessionStateStore,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let stale = store
            .get_agent_session(session_id)
            .is_some_and(Self::is_stale);
        if stale {
            tracing::warn!(session_id, "stale delegation detected, resetting to architect");
            store.start_agent_session(session_id, ORCHESTRATOR_NAME, now);
        }
        stale
    }

    /// Recover every stale session in the store; returns the ids recovered.
    pub fn sweep_stale(store: &mut SessionStateStore, now: DateTime<Utc>) -> Vec<String> {
        let stale_ids: Vec<String> = store
            .session_ids()
            .filter(|id| {
                store
                    .get_agent_session(id)
                    .is_some_and(Self::is_stale)
            })
            .map(str::to_string)
            .collect();
        for id in &stale_ids {
            store.start_agent_session(id, ORCHESTRATOR_NAME, now);
        }
        stale_ids
    }
}
