use chrono::{DateTime, Duration, Utc};
use swarm_identity::{Identity, ORCHESTRATOR_NAME};
use swarm_profile::{GuardrailsConfig, resolve};
use swarm_session::{DelegationTracker, GuardrailWindow, SessionStateStore};

use crate::error::{GuardrailWarning, LimitError};

/// Fingerprints are matched over a trailing window of
/// `max_repetitions * FINGERPRINT_WINDOW_FACTOR` calls, so a loop has to be
/// reasonably tight to trip, not merely recurrent.
const FINGERPRINT_WINDOW_FACTOR: usize = 2;

/// Identifies one tool invocation across the before/after hook pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallMeta {
    pub tool_name: String,
    pub session_id: String,
    pub call_id: String,
}

/// Result of a tool execution as reported to the post-call hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    Error,
}

fn fingerprint(tool_name: &str, payload: &str) -> String {
    format!("{tool_name}:{payload}")
}

/// Lifecycle hooks enforcing guardrails over agent sessions.
///
/// Owns the session store; the host holds one instance per plugin
/// activation and routes every lifecycle event through it synchronously.
/// Enablement is decided once at construction: a disabled config yields
/// no-op handlers.
#[derive(Debug)]
pub struct GuardrailsHooks {
    config: GuardrailsConfig,
    store: SessionStateStore,
    enabled: bool,
}

impl GuardrailsHooks {
    pub fn new(config: GuardrailsConfig) -> Self {
        Self::with_store(config, SessionStateStore::new())
    }

    /// Build over an existing store, for hosts that pre-seed session state.
    pub fn with_store(config: GuardrailsConfig, store: SessionStateStore) -> Self {
        let enabled = config.enabled;
        Self {
            config,
            store,
            enabled,
        }
    }

    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStateStore {
        &mut self.store
    }

    /// Drop all session state.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Gate one tool call. `Err` means the call must not run; `Ok(Some)`
    /// carries a one-shot advisory warning; `Ok(None)` admits silently.
    pub fn tool_before(
        &mut self,
        meta: &ToolCallMeta,
        payload: &str,
    ) -> Result<Option<GuardrailWarning>, LimitError> {
        self.tool_before_at(meta, payload, Utc::now())
    }

    pub fn tool_before_at(
        &mut self,
        meta: &ToolCallMeta,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<GuardrailWarning>, LimitError> {
        if !self.enabled {
            return Ok(None);
        }
        let session_id = meta.session_id.as_str();

        // Unknown session: recover to the orchestrator identity rather than
        // inventing an ungated sentinel.
        let raw = match self.store.active_agent(session_id) {
            Some(name) => name.to_string(),
            None => {
                self.store
                    .start_agent_session(session_id, ORCHESTRATOR_NAME, now);
                ORCHESTRATOR_NAME.to_string()
            }
        };

        // The session record is authoritative for exemption: the
        // active-agent map can diverge out of band, but only a session
        // whose own identity is the orchestrator goes ungated.
        let session = self.store.ensure_agent_session(session_id, Some(&raw), now);
        if session.identity().is_orchestrator() || Identity::of(&raw).is_orchestrator() {
            session.last_tool_call_at = Some(now);
            return Ok(None);
        }

        let effective = resolve(&self.config, Some(&raw));
        let verdict = match self.store.begin_invocation(session_id, Some(&raw), now) {
            Some(window) => evaluate(window, &effective, meta, payload, now),
            None => return Ok(None),
        };
        match verdict {
            Ok(warning) => {
                self.store.note_tool_call(session_id, now);
                if let Some(warning) = &warning {
                    tracing::warn!(session_id, %warning, "guardrail warning");
                }
                Ok(warning)
            }
            Err(error) => {
                self.store.latch_hard_limit(session_id);
                tracing::warn!(session_id, %error, "tool call blocked");
                Err(error)
            }
        }
    }

    /// Record a tool outcome. Never errors and never creates a window.
    pub fn tool_after(&mut self, meta: &ToolCallMeta, outcome: ToolOutcome) {
        if !self.enabled {
            return;
        }
        if let Some(window) = self.store.active_window_mut(&meta.session_id) {
            match outcome {
                ToolOutcome::Error => window.record_error(),
                ToolOutcome::Success => window.record_success(),
            }
        }
    }

    /// Apply a chat-message delegation signal.
    pub fn chat_message(&mut self, session_id: &str, agent: Option<&str>) {
        self.chat_message_at(session_id, agent, Utc::now());
    }

    pub fn chat_message_at(&mut self, session_id: &str, agent: Option<&str>, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        DelegationTracker::on_chat_message(&mut self.store, session_id, agent, now);
    }

    /// A delegated task tool finished; control returns to the architect.
    pub fn task_tool_completed(&mut self, session_id: &str) {
        self.task_tool_completed_at(session_id, Utc::now());
    }

    pub fn task_tool_completed_at(&mut self, session_id: &str, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        DelegationTracker::on_task_tool_complete(&mut self.store, session_id, now);
    }
}

/// Run the fatal checks in order, then the advisory one. Each fatal verdict
/// latches the window.
fn evaluate(
    window: &mut GuardrailWindow,
    config: &GuardrailsConfig,
    meta: &ToolCallMeta,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<Option<GuardrailWarning>, LimitError> {
    let agent = window.agent_name.clone();

    if window.hard_limit_hit {
        return Err(LimitError::HardStopLatched { agent });
    }

    if let Some(limit_minutes) = config.max_duration_minutes.bound() {
        if window.elapsed(now) > Duration::minutes(i64::from(limit_minutes)) {
            window.hard_limit_hit = true;
            return Err(LimitError::DurationExceeded {
                agent,
                limit_minutes,
            });
        }
    }

    if let Some(limit_minutes) = config.idle_timeout_minutes.bound() {
        if now - window.last_tool_call_at > Duration::minutes(i64::from(limit_minutes)) {
            window.hard_limit_hit = true;
            return Err(LimitError::IdleTimeout {
                agent,
                limit_minutes,
            });
        }
    }

    let prospective = window.tool_calls.saturating_add(1);
    if let Some(limit) = config.max_tool_calls.bound() {
        if prospective >= limit {
            // The rejected attempt is still counted, so status surfaces
            // show the budget as spent.
            window.tool_calls = prospective;
            window.hard_limit_hit = true;
            return Err(LimitError::ToolCallsExhausted {
                agent,
                limit,
                count: prospective,
            });
        }
    }

    let window_len = config.max_repetitions as usize * FINGERPRINT_WINDOW_FACTOR;
    let occurrences =
        window.record_fingerprint(&fingerprint(&meta.tool_name, payload), window_len);
    if occurrences >= config.max_repetitions as usize {
        window.hard_limit_hit = true;
        return Err(LimitError::RepetitionLoop {
            agent,
            tool_name: meta.tool_name.clone(),
            occurrences,
        });
    }

    if window.consecutive_errors >= config.max_consecutive_errors {
        window.hard_limit_hit = true;
        return Err(LimitError::ConsecutiveErrors {
            agent,
            count: window.consecutive_errors,
        });
    }

    window.tool_calls = prospective;
    window.last_tool_call_at = now;

    if let Some(limit) = config.max_tool_calls.bound() {
        if !window.warning_emitted
            && prospective as f32 / limit as f32 >= config.warning_threshold
        {
            window.warning_emitted = true;
            return Ok(Some(GuardrailWarning {
                agent,
                tool_calls: prospective,
                limit,
                threshold: config.warning_threshold,
            }));
        }
    }
    Ok(None)
}
