use swarm_identity::{AgentKind, names};

use crate::builtin::builtin_profile;
use crate::config::GuardrailsConfig;

/// Resolve the effective guardrails config for one agent.
///
/// Layering, lowest to highest: base config < built-in profile for the
/// resolved agent type (if recognized) < user profile from
/// `base.profiles`, where a key matching the full normalized name wins over
/// one matching the stripped base name. Names with neither a built-in nor a
/// user profile resolve to `base` unchanged; there is no architect fallback
/// for unrecognized agents, since that would silently exempt them.
///
/// Pure and deterministic: `base` is never mutated.
pub fn resolve(base: &GuardrailsConfig, agent_name: Option<&str>) -> GuardrailsConfig {
    let Some(raw) = agent_name else {
        return base.clone();
    };

    let full = names::normalize(raw);
    let stripped = names::strip_swarm_prefix(&full);

    let mut effective = base.clone();
    if let Some(kind) = AgentKind::from_name(stripped) {
        builtin_profile(kind).apply(&mut effective);
    }
    let user = base
        .profiles
        .get(&full)
        .or_else(|| base.profiles.get(stripped));
    if let Some(profile) = user {
        profile.apply(&mut effective);
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentProfile;
    use crate::limit::Limit;

    fn base_with_profiles(profiles: &[(&str, AgentProfile)]) -> GuardrailsConfig {
        let mut base = GuardrailsConfig::default();
        for (name, profile) in profiles {
            base.profiles.insert((*name).to_string(), profile.clone());
        }
        base
    }

    #[test]
    fn test_no_name_returns_base() {
        let base = GuardrailsConfig::default();
        assert_eq!(resolve(&base, None), base);
    }

    #[test]
    fn test_unknown_name_returns_base_unchanged() {
        let base = GuardrailsConfig::default();
        let effective = resolve(&base, Some("mystery_agent"));
        assert_eq!(effective, base);
        // Specifically: no architect fallback, so the budget stays bounded.
        assert!(effective.max_tool_calls.is_bounded());
    }

    #[test]
    fn test_architect_builtin_layers_over_base() {
        let base = GuardrailsConfig::default();
        let effective = resolve(&base, Some("architect"));
        assert_eq!(effective.max_tool_calls, Limit::Unbounded);
        assert_eq!(effective.max_duration_minutes, Limit::Unbounded);
        assert_eq!(effective.warning_threshold, 0.75);
        // Not present in the architect built-in: stays at the base value.
        assert_eq!(effective.max_repetitions, base.max_repetitions);
    }

    #[test]
    fn test_resolve_is_idempotent_and_pure() {
        let base = base_with_profiles(&[(
            "coder",
            AgentProfile {
                max_tool_calls: Some(Limit::AtMost(33)),
                ..AgentProfile::default()
            },
        )]);
        let before = base.clone();
        let first = resolve(&base, Some("coder"));
        let second = resolve(&base, Some("coder"));
        assert_eq!(first, second);
        assert_eq!(base, before, "resolve must not mutate the base config");
    }

    #[test]
    fn test_user_profile_wins_over_builtin() {
        let base = base_with_profiles(&[(
            "coder",
            AgentProfile {
                max_tool_calls: Some(Limit::AtMost(10)),
                ..AgentProfile::default()
            },
        )]);
        let effective = resolve(&base, Some("coder"));
        // Built-in says 200; the user profile overrides it.
        assert_eq!(effective.max_tool_calls, Limit::AtMost(10));
        // Fields the user left unset come from the built-in.
        assert_eq!(effective.max_duration_minutes, Limit::AtMost(120));
    }

    #[test]
    fn test_prefixed_name_resolves_like_base_name() {
        let base = base_with_profiles(&[(
            "coder",
            AgentProfile {
                max_tool_calls: Some(Limit::AtMost(10)),
                warning_threshold: Some(0.6),
                ..AgentProfile::default()
            },
        )]);
        let direct = resolve(&base, Some("coder"));
        let prefixed = resolve(&base, Some("mega_coder"));
        assert_eq!(direct, prefixed);
    }

    #[test]
    fn test_full_name_profile_preferred_over_stripped() {
        let base = base_with_profiles(&[
            (
                "coder",
                AgentProfile {
                    max_tool_calls: Some(Limit::AtMost(10)),
                    ..AgentProfile::default()
                },
            ),
            (
                "mega_coder",
                AgentProfile {
                    max_tool_calls: Some(Limit::AtMost(3)),
                    ..AgentProfile::default()
                },
            ),
        ]);
        assert_eq!(
            resolve(&base, Some("mega_coder")).max_tool_calls,
            Limit::AtMost(3)
        );
        assert_eq!(
            resolve(&base, Some("nova_coder")).max_tool_calls,
            Limit::AtMost(10)
        );
    }

    #[test]
    fn test_name_normalization_before_lookup() {
        let base = base_with_profiles(&[(
            "test_engineer",
            AgentProfile {
                max_repetitions: Some(4),
                ..AgentProfile::default()
            },
        )]);
        let effective = resolve(&base, Some("Test-Engineer"));
        assert_eq!(effective.max_repetitions, 4);
    }

    #[test]
    fn test_partial_word_is_not_an_alias() {
        let base = GuardrailsConfig::default();
        // "architectural" must not pick up the architect built-in.
        let effective = resolve(&base, Some("architectural"));
        assert_eq!(effective, base);
    }
}
