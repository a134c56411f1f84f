//! Navigation fields
//!
//! Static potentials are computed once per exit cluster during setup.
//! The dynamic potential is a single live field updated every step.

pub mod dynamic;
pub mod field;
pub mod manager;
pub mod static_potential;

pub use dynamic::DynamicPotential;
pub use field::{compute_static_potential, CELL_LENGTH, DIAGONAL_COST, ORTHOGONAL_COST};
pub use manager::PotentialManager;
pub use static_potential::{EvacPotential, StaticPotential};
