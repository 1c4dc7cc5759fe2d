use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::limit::Limit;

/// Validated guardrails configuration, owned by the host's config loader.
///
/// The loader enforces field bounds before this type is handed over and
/// falls back to `Default` (with `enabled: true`) on any load failure, so
/// the engine never re-validates and a broken config file never disables
/// enforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailsConfig {
    pub enabled: bool,
    /// Tool calls per window before a hard stop.
    pub max_tool_calls: Limit,
    /// Wall-clock minutes per window before a hard stop.
    pub max_duration_minutes: Limit,
    /// Identical tool+argument fingerprints tolerated in the trailing window.
    pub max_repetitions: u32,
    /// Consecutive tool errors tolerated before a hard stop.
    pub max_consecutive_errors: u32,
    /// Fraction of the tool-call budget at which a one-shot warning fires.
    pub warning_threshold: f32,
    /// Minutes of window inactivity before a hard stop.
    pub idle_timeout_minutes: Limit,
    /// Per-agent overrides, keyed by normalized agent name (full or base).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub profiles: HashMap<String, AgentProfile>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tool_calls: Limit::AtMost(100),
            max_duration_minutes: Limit::AtMost(60),
            max_repetitions: 10,
            max_consecutive_errors: 5,
            warning_threshold: 0.8,
            idle_timeout_minutes: Limit::AtMost(30),
            profiles: HashMap::new(),
        }
    }
}

/// Partial per-agent override. Unset fields inherit from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tool_calls: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_minutes: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repetitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_consecutive_errors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_minutes: Option<Limit>,
}

impl AgentProfile {
    /// Layer this profile's set fields over `config`.
    pub fn apply(&self, config: &mut GuardrailsConfig) {
        if let Some(v) = self.max_tool_calls {
            config.max_tool_calls = v;
        }
        if let Some(v) = self.max_duration_minutes {
            config.max_duration_minutes = v;
        }
        if let Some(v) = self.max_repetitions {
            config.max_repetitions = v;
        }
        if let Some(v) = self.max_consecutive_errors {
            config.max_consecutive_errors = v;
        }
        if let Some(v) = self.warning_threshold {
            config.warning_threshold = v;
        }
        if let Some(v) = self.idle_timeout_minutes {
            config.idle_timeout_minutes = v;
        }
    }
}
