pub mod builtin;
pub mod config;
pub mod limit;
pub mod resolve;

pub use builtin::builtin_profile;
pub use config::{AgentProfile, GuardrailsConfig};
pub use limit::Limit;
pub use resolve::resolve;
