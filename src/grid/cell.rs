//! Grid cells - the unit of occupancy and potential assignment
//!
//! Every cell kind shares one struct; behaviour that differs per kind is a
//! `match` on [`CellKind`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, CellId, FloorId, RoomId, Time};
use crate::grid::direction::Direction8;

bitflags! {
    /// Open bounds of a cell, one bit per heading
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Passability: u8 {
        const TOP = 1 << 0;
        const TOP_RIGHT = 1 << 1;
        const RIGHT = 1 << 2;
        const BOTTOM_RIGHT = 1 << 3;
        const BOTTOM = 1 << 4;
        const BOTTOM_LEFT = 1 << 5;
        const LEFT = 1 << 6;
        const TOP_LEFT = 1 << 7;
    }
}

impl Passability {
    pub fn of(dir: Direction8) -> Self {
        Self::from_bits_truncate(1 << dir.index())
    }
}

/// Height of the neighbour in a direction relative to this cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Level {
    Higher,
    #[default]
    Equal,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellKind {
    Room,
    Exit { attractivity: u32 },
    Save,
    Stair { up_factor: f64, down_factor: f64 },
    Door,
    Teleport { targets: Vec<CellId> },
}

impl CellKind {
    pub fn is_exit(&self) -> bool {
        matches!(self, CellKind::Exit { .. })
    }

    pub fn is_door(&self) -> bool {
        matches!(self, CellKind::Door)
    }

    /// Cells an individual that is already safe may still step on
    pub fn is_safe_area(&self) -> bool {
        matches!(self, CellKind::Save | CellKind::Exit { .. })
    }

    /// Speed multiplier for leaving the cell towards a neighbour on `level`
    pub fn stair_factor(&self, level: Level) -> f64 {
        match (self, level) {
            (CellKind::Stair { up_factor, .. }, Level::Higher) => *up_factor,
            (CellKind::Stair { down_factor, .. }, Level::Lower) => *down_factor,
            _ => 1.0,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            CellKind::Room => "room",
            CellKind::Exit { .. } => "exit",
            CellKind::Save => "save",
            CellKind::Stair { .. } => "stair",
            CellKind::Door => "door",
            CellKind::Teleport { .. } => "teleport",
        }
    }
}

/// Default attractivity of an exit cell
pub const DEFAULT_EXIT_ATTRACTIVITY: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub room: RoomId,
    pub floor: FloorId,
    /// Coordinates local to the owning room
    pub x: i32,
    pub y: i32,
    /// Local coordinates plus the room offset
    pub abs_x: i32,
    pub abs_y: i32,
    pub speed_factor: f64,
    pub passable: Passability,
    pub levels: [Level; 8],
    pub kind: CellKind,
    occupied_until: Time,
    occupant: Option<AgentId>,
}

impl Cell {
    pub fn new(id: CellId, room: RoomId, floor: FloorId, local: (i32, i32), offset: (i32, i32)) -> Self {
        Self {
            id,
            room,
            floor,
            x: local.0,
            y: local.1,
            abs_x: local.0 + offset.0,
            abs_y: local.1 + offset.1,
            speed_factor: 1.0,
            passable: Passability::all(),
            levels: [Level::Equal; 8],
            kind: CellKind::Room,
            occupied_until: 0.0,
            occupant: None,
        }
    }

    pub fn occupant(&self) -> Option<AgentId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupied_until(&self) -> Time {
        self.occupied_until
    }

    pub fn is_open(&self, dir: Direction8) -> bool {
        self.passable.contains(Passability::of(dir))
    }

    /// A cell with every bound closed cannot be entered or left
    pub fn is_passable(&self) -> bool {
        !self.passable.is_empty()
    }

    pub fn level(&self, dir: Direction8) -> Level {
        self.levels[dir.index()]
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<AgentId>) {
        self.occupant = occupant;
    }

    pub(crate) fn set_occupied_until(&mut self, time: Time) {
        self.occupied_until = time;
    }
}

/// Cells are the same place when floor and absolute coordinates agree
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.floor == other.floor && self.abs_x == other.abs_x && self.abs_y == other.abs_y
    }
}

impl Eq for Cell {}
