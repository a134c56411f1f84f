//! Evac CA - cellular automaton pedestrian evacuation
//!
//! A building is a grid of cells grouped in rooms. Static potentials lead
//! from every cell to the exits, a dynamic potential remembers where the
//! crowd went. Rules move individuals step by step; every change is an
//! action, applied through the state controller and kept in a log that
//! replays the run exactly.

pub mod actions;
pub mod agent;
pub mod core;
pub mod grid;
pub mod params;
pub mod potential;
pub mod rules;
pub mod simulation;
pub mod state;
pub mod stats;

pub use crate::core::{EvacError, Result, SimulationConfig};
pub use crate::simulation::{Simulation, StepResult};
