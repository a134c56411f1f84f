//! Simulation engine, run context and processing order

pub mod context;
pub mod engine;
pub mod order;

pub use context::SimulationContext;
pub use engine::{RunSummary, Simulation, SimulationPhase, StepResult};
pub use order::AgentOrder;
