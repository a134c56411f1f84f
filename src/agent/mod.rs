//! Individuals, their mutable properties and lifecycle bookkeeping

pub mod individual;
pub mod properties;
pub mod store;

pub use individual::Individual;
pub use properties::{AgentProperties, AgentPropertySnapshot, DeathCause, Lifecycle};
pub use store::AgentStore;
