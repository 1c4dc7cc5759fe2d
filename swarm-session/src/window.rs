use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use swarm_profile::Limit;

/// Accounting record for one identity's active episode of tool usage within
/// a session.
///
/// Created lazily on the first non-exempt call; the orchestrator never has
/// one. Once `hard_limit_hit` latches it stays latched for the remaining
/// life of the window.
#[derive(Debug, Clone)]
pub struct GuardrailWindow {
    /// Raw agent name this window accounts for.
    pub agent_name: String,
    /// Gated tool calls admitted (plus the attempt that tripped the budget).
    pub tool_calls: u32,
    pub started_at: DateTime<Utc>,
    /// This window's own last activity. Idle timeouts are evaluated against
    /// this field, never against a cross-identity shared clock.
    pub last_tool_call_at: DateTime<Utc>,
    /// Updated by the post-call hook: bumped on error, cleared on success.
    pub consecutive_errors: u32,
    pub hard_limit_hit: bool,
    pub warning_emitted: bool,
    recent_fingerprints: VecDeque<String>,
}

impl GuardrailWindow {
    pub fn new(agent_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            tool_calls: 0,
            started_at: now,
            last_tool_call_at: now,
            consecutive_errors: 0,
            hard_limit_hit: false,
            warning_emitted: false,
            recent_fingerprints: VecDeque::new(),
        }
    }

    /// Record a tool+argument fingerprint and return how many identical
    /// fingerprints (including this one) sit in the trailing window of
    /// `window_len` calls.
    pub fn record_fingerprint(&mut self, fingerprint: &str, window_len: usize) -> usize {
        self.recent_fingerprints.push_back(fingerprint.to_string());
        while self.recent_fingerprints.len() > window_len {
            self.recent_fingerprints.pop_front();
        }
        self.recent_fingerprints
            .iter()
            .filter(|f| f.as_str() == fingerprint)
            .count()
    }

    pub fn record_error(&mut self) {
        self.consecutive_errors += 1;
    }

    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    /// Calls left before the budget trips, if the budget is bounded.
    pub fn remaining_calls(&self, budget: Limit) -> Option<u32> {
        budget.bound().map(|max| max.saturating_sub(self.tool_calls))
    }

    /// Time since this window opened.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }
}
