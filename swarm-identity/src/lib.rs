pub mod identity;
pub mod names;

pub use identity::Identity;
pub use names::{AgentKind, ORCHESTRATOR_NAME, UNATTRIBUTED_AGENT, normalize, strip_swarm_prefix};
