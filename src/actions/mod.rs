//! Actions, the per-step log and replay

pub mod action;
pub mod log;

pub use action::{apply, Action};
pub use log::{ActionLog, InitialConfiguration, Replayer};
