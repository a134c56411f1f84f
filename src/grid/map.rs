//! Building grid - the arena that owns every cell and room
//!
//! Cells are addressed by [`CellId`] (their index in the arena). Rooms keep
//! index lists, never references, so the state controller can mutate
//! occupancy without aliasing.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EvacError, Result};
use crate::core::types::{CellId, FloorId, RoomId};
use crate::grid::cell::{Cell, CellKind, Level, Passability};
use crate::grid::direction::Direction8;
use crate::grid::exit::{discover_exit_clusters, ExitCluster};
use crate::grid::room::Room;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Cell>,
    rooms: Vec<Room>,
    #[serde(skip)]
    index: AHashMap<(FloorId, i32, i32), CellId>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rectangular room with every cell present
    pub fn add_room(&mut self, floor: FloorId, offset: (i32, i32), width: u32, height: u32) -> Result<RoomId> {
        let local: Vec<(i32, i32)> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| (x, y)))
            .collect();
        self.insert_room(floor, offset, width, height, &local)
    }

    /// Add a room that only has the given local cells
    pub fn add_sparse_room(&mut self, floor: FloorId, offset: (i32, i32), cells: &[(i32, i32)]) -> Result<RoomId> {
        let width = cells.iter().map(|c| c.0 + 1).max().unwrap_or(0).max(0) as u32;
        let height = cells.iter().map(|c| c.1 + 1).max().unwrap_or(0).max(0) as u32;
        self.insert_room(floor, offset, width, height, cells)
    }

    fn insert_room(
        &mut self,
        floor: FloorId,
        offset: (i32, i32),
        width: u32,
        height: u32,
        local: &[(i32, i32)],
    ) -> Result<RoomId> {
        let room_id = RoomId(self.rooms.len() as u32);
        let mut room = Room::new(room_id, floor, offset, width, height);

        for &(x, y) in local {
            let key = (floor, x + offset.0, y + offset.1);
            if let Some(existing) = self.index.get(&key) {
                return Err(EvacError::InvalidConfig(format!(
                    "{} overlaps {} at ({}, {}) on floor {}",
                    room_id, existing, key.1, key.2, floor
                )));
            }
            let id = CellId(self.cells.len());
            self.cells.push(Cell::new(id, room_id, floor, (x, y), offset));
            self.index.insert(key, id);
            room.push_cell(id);
        }

        self.rooms.push(room);
        Ok(room_id)
    }

    /// Rebuild the coordinate index (after deserialization)
    pub fn reindex(&mut self) {
        self.index = self
            .cells
            .iter()
            .map(|c| ((c.floor, c.abs_x, c.abs_y), c.id))
            .collect();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        self.cells.get(id.0).ok_or(EvacError::UnknownCell(id))
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.cells.get_mut(id.0).ok_or(EvacError::UnknownCell(id))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cell at absolute coordinates
    pub fn cell_at(&self, floor: FloorId, x: i32, y: i32) -> Option<CellId> {
        self.index.get(&(floor, x, y)).copied()
    }

    /// Cell at coordinates local to a room
    pub fn room_cell(&self, room: RoomId, x: i32, y: i32) -> Option<CellId> {
        let room = self.rooms.get(room.0 as usize)?;
        self.cell_at(room.floor, x + room.offset.0, y + room.offset.1)
    }

    pub fn room(&self, id: RoomId) -> Result<&Room> {
        self.rooms
            .get(id.0 as usize)
            .ok_or_else(|| EvacError::InvalidConfig(format!("unknown {}", id)))
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> Result<&mut Room> {
        self.rooms
            .get_mut(id.0 as usize)
            .ok_or_else(|| EvacError::InvalidConfig(format!("unknown {}", id)))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn set_kind(&mut self, id: CellId, kind: CellKind) -> Result<()> {
        if let CellKind::Stair { up_factor, down_factor } = kind {
            for value in [up_factor, down_factor] {
                if !(value > 0.0 && value <= 1.0) {
                    return Err(EvacError::StairFactorOutOfRange { cell: id, value });
                }
            }
        }
        if let CellKind::Teleport { targets } = &kind {
            if let Some(missing) = targets.iter().find(|t| t.0 >= self.cells.len()) {
                return Err(EvacError::InvalidConfig(format!("{} teleports to unknown {}", id, missing)));
            }
        }
        self.cell_mut(id)?.kind = kind;
        Ok(())
    }

    pub fn set_speed_factor(&mut self, id: CellId, value: f64) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(EvacError::SpeedFactorOutOfRange { cell: id, value });
        }
        self.cell_mut(id)?.speed_factor = value;
        Ok(())
    }

    pub fn set_level(&mut self, id: CellId, dir: Direction8, level: Level) -> Result<()> {
        self.cell_mut(id)?.levels[dir.index()] = level;
        Ok(())
    }

    /// Close the bound between `id` and its neighbour in `dir` (both sides)
    pub fn block(&mut self, id: CellId, dir: Direction8) -> Result<()> {
        let (floor, x, y) = {
            let cell = self.cell(id)?;
            (cell.floor, cell.abs_x, cell.abs_y)
        };
        self.cell_mut(id)?.passable.remove(Passability::of(dir));

        let (dx, dy) = dir.offset();
        if let Some(other) = self.cell_at(floor, x + dx, y + dy) {
            self.cell_mut(other)?.passable.remove(Passability::of(dir.opposite()));
        }
        Ok(())
    }

    /// Close every bound of a cell
    pub fn enclose(&mut self, id: CellId) -> Result<()> {
        for dir in Direction8::ALL {
            self.block(id, dir)?;
        }
        Ok(())
    }

    /// Neighbour in `dir`, if the bound is open on both sides
    ///
    /// A diagonal step also needs both orthogonal cells it passes between
    /// to be reachable, so individuals never cut a wall corner.
    pub fn neighbor(&self, id: CellId, dir: Direction8) -> Option<CellId> {
        let cell = self.cells.get(id.0)?;
        let target = self.direct_neighbor(cell, dir)?;

        if let Some((a, b)) = dir.orthogonal_components() {
            self.direct_neighbor(cell, a)?;
            self.direct_neighbor(cell, b)?;
        }
        Some(target)
    }

    fn direct_neighbor(&self, cell: &Cell, dir: Direction8) -> Option<CellId> {
        if !cell.is_open(dir) {
            return None;
        }
        let (dx, dy) = dir.offset();
        let other = self.cell_at(cell.floor, cell.abs_x + dx, cell.abs_y + dy)?;
        if self.cells[other.0].is_open(dir.opposite()) {
            Some(other)
        } else {
            None
        }
    }

    /// All reachable neighbours in clockwise order starting at `Top`
    pub fn neighbors(&self, id: CellId) -> Vec<(Direction8, CellId)> {
        Direction8::ALL
            .iter()
            .filter_map(|&dir| self.neighbor(id, dir).map(|n| (dir, n)))
            .collect()
    }

    pub fn exit_clusters(&self) -> Vec<ExitCluster> {
        discover_exit_clusters(self)
    }
}
