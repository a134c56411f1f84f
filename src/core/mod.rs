pub mod config;
pub mod error;
pub mod types;

pub use config::{InitialPotentialPolicy, MovementPolicy, SimulationConfig};
pub use error::{EvacError, Result};
pub use types::{AgentId, CellId, FloorId, PotentialId, RoomId, Step, Time};
