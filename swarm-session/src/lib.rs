pub mod delegation;
pub mod store;
pub mod window;

pub use delegation::DelegationTracker;
pub use store::{AgentSession, SessionStateStore};
pub use window::GuardrailWindow;
