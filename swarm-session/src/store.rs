use std::collections::HashMap;

use chrono::{DateTime, Utc};
use swarm_identity::{Identity, UNATTRIBUTED_AGENT, names};

use crate::window::GuardrailWindow;

/// Per-session identity and delegation state.
///
/// `last_tool_call_at` tracks tool recency for the session as a whole;
/// delegation staleness is judged against `delegation_active` and the
/// delegation timestamps, never against this field.
#[derive(Debug, Clone)]
pub struct AgentSession {
    /// Raw agent name currently speaking for this session.
    pub agent_name: String,
    /// True while a subagent identity holds the session.
    pub delegation_active: bool,
    pub delegation_started_at: DateTime<Utc>,
    /// Set when control returns to the orchestrator; cleared on handoff.
    pub delegation_ended_at: Option<DateTime<Utc>>,
    /// Last gated or exempt tool call seen on this session, if any.
    pub last_tool_call_at: Option<DateTime<Utc>>,
    /// Tool calls admitted under the current identity.
    pub tool_call_count: u32,
    pub hard_limit_hit: bool,
    /// Guardrail windows keyed by normalized agent name. Survive identity
    /// handoffs so a returning identity resumes its own accounting.
    pub(crate) windows: HashMap<String, GuardrailWindow>,
}

impl AgentSession {
    pub fn new(agent_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            delegation_active: Identity::of(agent_name).is_subagent(),
            delegation_started_at: now,
            delegation_ended_at: None,
            last_tool_call_at: None,
            tool_call_count: 0,
            hard_limit_hit: false,
            windows: HashMap::new(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.agent_name)
    }
}

/// In-memory store mapping session ids to agent state.
///
/// Owned by the hooks layer and passed by `&mut`; there is no global
/// instance. `active_agent` is a separate map so diagnostic overwrites can
/// diverge from the session record without disturbing window accounting.
#[derive(Debug, Default)]
pub struct SessionStateStore {
    sessions: HashMap<String, AgentSession>,
    active_agent: HashMap<String, String>,
}

impl SessionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all sessions and active-agent entries.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.active_agent.clear();
    }

    /// Fetch the session, creating it with `agent_name` (or the
    /// unattributed sentinel) on first sight. Never changes the identity of
    /// an existing session.
    pub fn ensure_agent_session(
        &mut self,
        session_id: &str,
        agent_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> &mut AgentSession {
        let fallback = agent_name.unwrap_or(UNATTRIBUTED_AGENT);
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| AgentSession::new(fallback, now));
        self.active_agent
            .entry(session_id.to_string())
            .or_insert_with(|| session.agent_name.clone());
        session
    }

    /// Hand the session to `agent_name`, resetting per-identity counters.
    ///
    /// This is the only path that changes a session's identity. The new
    /// identity's window (if one survives from an earlier episode) is
    /// discarded so the handoff starts a fresh episode.
    pub fn start_agent_session(&mut self, session_id: &str, agent_name: &str, now: DateTime<Utc>) {
        let session = self.ensure_agent_session(session_id, Some(agent_name), now);
        session.agent_name = agent_name.to_string();
        session.delegation_active = Identity::of(agent_name).is_subagent();
        session.delegation_started_at = now;
        session.delegation_ended_at = None;
        session.last_tool_call_at = None;
        session.tool_call_count = 0;
        session.hard_limit_hit = false;
        session.windows.remove(&names::normalize(agent_name));
        self.active_agent
            .insert(session_id.to_string(), agent_name.to_string());
        tracing::debug!(session_id, agent = agent_name, "agent session started");
    }

    pub fn get_agent_session(&self, session_id: &str) -> Option<&AgentSession> {
        self.sessions.get(session_id)
    }

    pub fn get_agent_session_mut(&mut self, session_id: &str) -> Option<&mut AgentSession> {
        self.sessions.get_mut(session_id)
    }

    /// Name currently answering for the session, per the active-agent map.
    pub fn active_agent(&self, session_id: &str) -> Option<&str> {
        self.active_agent.get(session_id).map(String::as_str)
    }

    /// Window for the session's current identity, creating one lazily.
    /// Returns `None` while the orchestrator holds the session: it never
    /// accrues a window.
    pub fn begin_invocation(
        &mut self,
        session_id: &str,
        agent_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<&mut GuardrailWindow> {
        self.ensure_agent_session(session_id, agent_name, now);
        let session = self.sessions.get_mut(session_id)?;
        if session.identity().is_orchestrator() {
            return None;
        }
        let key = names::normalize(&session.agent_name);
        let owner = session.agent_name.clone();
        Some(
            session
                .windows
                .entry(key)
                .or_insert_with(|| GuardrailWindow::new(&owner, now)),
        )
    }

    /// Window for the session's current identity, if one already exists.
    /// `None` for an exempt identity.
    pub fn get_active_window(&self, session_id: &str) -> Option<&GuardrailWindow> {
        let session = self.sessions.get(session_id)?;
        if session.identity().is_orchestrator() {
            return None;
        }
        session.windows.get(&names::normalize(&session.agent_name))
    }

    /// Window for the session's current identity, if one already exists.
    pub fn active_window_mut(&mut self, session_id: &str) -> Option<&mut GuardrailWindow> {
        let session = self.sessions.get_mut(session_id)?;
        if session.identity().is_orchestrator() {
            return None;
        }
        let key = names::normalize(&session.agent_name);
        session.windows.get_mut(&key)
    }

    /// Refresh the session's tool-recency timestamp without counting a call.
    pub fn touch(&mut self, session_id: &str, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.last_tool_call_at = Some(now);
        }
    }

    /// Count an admitted tool call against the session.
    pub fn note_tool_call(&mut self, session_id: &str, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.tool_call_count += 1;
            session.last_tool_call_at = Some(now);
        }
    }

    /// Latch the session-level hard stop. Stays set until the next handoff.
    pub fn latch_hard_limit(&mut self, session_id: &str) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.hard_limit_hit = true;
        }
    }

    /// Record that delegation ended without changing the session identity.
    pub fn mark_delegation_ended(&mut self, session_id: &str, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.delegation_active = false;
            session.delegation_ended_at = Some(now);
        }
    }

    /// Rewrite the active-agent map entry without going through
    /// `start_agent_session`. Diagnostic escape hatch: counters, windows,
    /// and the session's own identity are untouched, so a latched gate
    /// stays latched under the divergence.
    pub fn overwrite_active_agent(&mut self, session_id: &str, agent_name: &str) {
        self.active_agent
            .insert(session_id.to_string(), agent_name.to_string());
    }

    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use swarm_identity::ORCHESTRATOR_NAME;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ensure_creates_with_sentinel_when_unnamed() {
        let mut store = SessionStateStore::new();
        let session = store.ensure_agent_session("s1", None, t0());
        assert_eq!(session.agent_name, UNATTRIBUTED_AGENT);
        assert!(session.delegation_active);
        assert_eq!(store.active_agent("s1"), Some(UNATTRIBUTED_AGENT));
    }

    #[test]
    fn test_ensure_never_changes_existing_identity() {
        let mut store = SessionStateStore::new();
        store.ensure_agent_session("s1", Some("coder"), t0());
        let session = store.ensure_agent_session("s1", Some("reviewer"), t0());
        assert_eq!(session.agent_name, "coder");
        assert_eq!(store.active_agent("s1"), Some("coder"));
    }

    #[test]
    fn test_start_agent_session_resets_counters() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        store.note_tool_call("s1", t0());
        store.latch_hard_limit("s1");

        store.start_agent_session("s1", "reviewer", t0());
        let session = store.get_agent_session("s1").unwrap();
        assert_eq!(session.agent_name, "reviewer");
        assert_eq!(session.tool_call_count, 0);
        assert!(!session.hard_limit_hit);
        assert_eq!(session.last_tool_call_at, None);
        assert!(session.delegation_active);
        assert_eq!(session.delegation_ended_at, None);
        assert_eq!(store.active_agent("s1"), Some("reviewer"));
    }

    #[test]
    fn test_orchestrator_handoff_clears_delegation() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        store.start_agent_session("s1", ORCHESTRATOR_NAME, t0());
        let session = store.get_agent_session("s1").unwrap();
        assert!(!session.delegation_active);
        assert!(session.identity().is_orchestrator());
    }

    #[test]
    fn test_begin_invocation_none_for_orchestrator() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", ORCHESTRATOR_NAME, t0());
        assert!(store.begin_invocation("s1", None, t0()).is_none());
        assert!(store.active_window_mut("s1").is_none());
    }

    #[test]
    fn test_begin_invocation_keys_window_by_session_identity() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "mystery_agent", t0());
        {
            let window = store.begin_invocation("s1", None, t0()).unwrap();
            window.tool_calls = 2;
            window.hard_limit_hit = true;
        }
        // Rewriting the active-agent map must not mint a fresh window.
        store.overwrite_active_agent("s1", "different_agent");
        let window = store.begin_invocation("s1", Some("different_agent"), t0()).unwrap();
        assert!(window.hard_limit_hit);
        assert_eq!(window.tool_calls, 2);
    }

    #[test]
    fn test_start_agent_session_discards_returning_identitys_window() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        store.begin_invocation("s1", None, t0()).unwrap().tool_calls = 7;
        store.start_agent_session("s1", "reviewer", t0());
        store.start_agent_session("s1", "coder", t0());
        let window = store.begin_invocation("s1", None, t0()).unwrap();
        assert_eq!(window.tool_calls, 0);
    }

    #[test]
    fn test_windows_survive_handoff_to_another_identity() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        store.begin_invocation("s1", None, t0()).unwrap().tool_calls = 7;
        store.start_agent_session("s1", "reviewer", t0());
        // The coder window is still held; only the reviewer's was cleared.
        let session = store.get_agent_session("s1").unwrap();
        assert_eq!(session.windows.get("coder").map(|w| w.tool_calls), Some(7));
    }

    #[test]
    fn test_mark_delegation_ended() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        let later = t0() + chrono::Duration::minutes(5);
        store.mark_delegation_ended("s1", later);
        let session = store.get_agent_session("s1").unwrap();
        assert!(!session.delegation_active);
        assert_eq!(session.delegation_ended_at, Some(later));
        // Identity unchanged: still a coder on the record.
        assert_eq!(session.agent_name, "coder");
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("s1", "coder", t0());
        store.start_agent_session("s2", "reviewer", t0());
        assert_eq!(store.len(), 2);
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.active_agent("s1"), None);
    }

    #[test]
    fn test_session_ids_enumerates_sessions() {
        let mut store = SessionStateStore::new();
        store.start_agent_session("a", "coder", t0());
        store.start_agent_session("b", "reviewer", t0());
        let mut ids: Vec<&str> = store.session_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
