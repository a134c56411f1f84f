//! Building model - cells, rooms and exits
//!
//! Passive data holders with neighbour and geometry queries. Occupancy is
//! readable by everyone but only written through the state controller.

pub mod cell;
pub mod direction;
pub mod exit;
pub mod layout;
pub mod map;
pub mod room;

pub use cell::{Cell, CellKind, Level, Passability, DEFAULT_EXIT_ATTRACTIVITY};
pub use direction::Direction8;
pub use exit::{discover_exit_clusters, ExitCluster};
pub use layout::{parse_layout, Layout};
pub use map::Grid;
pub use room::Room;
