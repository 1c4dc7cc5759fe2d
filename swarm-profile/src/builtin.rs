use swarm_identity::AgentKind;

use crate::config::AgentProfile;
use crate::limit::Limit;

/// Built-in per-agent-type defaults, layered between the base config and any
/// user-supplied profile.
///
/// The architect runs unbounded (it is exempt from windows anyway, but the
/// resolved profile is still visible to status surfaces) and deliberately
/// leaves `max_repetitions` to the base config.
pub fn builtin_profile(kind: AgentKind) -> AgentProfile {
    match kind {
        AgentKind::Architect => AgentProfile {
            max_tool_calls: Some(Limit::Unbounded),
            max_duration_minutes: Some(Limit::Unbounded),
            warning_threshold: Some(0.75),
            ..AgentProfile::default()
        },
        AgentKind::Coder => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(200)),
            max_duration_minutes: Some(Limit::AtMost(120)),
            ..AgentProfile::default()
        },
        AgentKind::TestEngineer => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(150)),
            max_duration_minutes: Some(Limit::AtMost(90)),
            max_consecutive_errors: Some(8),
            ..AgentProfile::default()
        },
        AgentKind::Explorer => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(75)),
            max_duration_minutes: Some(Limit::AtMost(30)),
            idle_timeout_minutes: Some(Limit::AtMost(15)),
            ..AgentProfile::default()
        },
        AgentKind::Reviewer => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(60)),
            max_duration_minutes: Some(Limit::AtMost(45)),
            ..AgentProfile::default()
        },
        AgentKind::Critic => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(40)),
            max_duration_minutes: Some(Limit::AtMost(30)),
            ..AgentProfile::default()
        },
        AgentKind::Sme => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(40)),
            max_duration_minutes: Some(Limit::AtMost(30)),
            ..AgentProfile::default()
        },
        AgentKind::Docs => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(80)),
            max_duration_minutes: Some(Limit::AtMost(60)),
            ..AgentProfile::default()
        },
        AgentKind::Designer => AgentProfile {
            max_tool_calls: Some(Limit::AtMost(80)),
            max_duration_minutes: Some(Limit::AtMost(60)),
            ..AgentProfile::default()
        },
    }
}
