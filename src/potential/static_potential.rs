//! Static potential - one immutable distance field per exit cluster

use ahash::AHashMap;

use crate::core::error::{EvacError, Result};
use crate::core::types::{CellId, PotentialId};
use crate::grid::map::Grid;

#[derive(Debug, Clone)]
pub struct StaticPotential {
    pub id: PotentialId,
    pub exit_cluster: u32,
    pub attractivity: u32,
    potential: AHashMap<CellId, i32>,
    distance: AHashMap<CellId, f64>,
    max_potential: i32,
    max_distance: f64,
}

impl StaticPotential {
    pub fn new(id: PotentialId, exit_cluster: u32, attractivity: u32) -> Self {
        Self {
            id,
            exit_cluster,
            attractivity,
            potential: AHashMap::new(),
            distance: AHashMap::new(),
            max_potential: 0,
            max_distance: 0.0,
        }
    }

    /// Assign a cell; every cell can be assigned only once
    pub fn set(&mut self, cell: CellId, potential: i32, distance: f64) -> Result<()> {
        if self.potential.contains_key(&cell) {
            return Err(EvacError::PotentialAlreadySet {
                cell,
                potential: self.id,
            });
        }
        self.potential.insert(cell, potential);
        self.distance.insert(cell, distance);
        self.max_potential = self.max_potential.max(potential);
        self.max_distance = self.max_distance.max(distance);
        Ok(())
    }

    pub fn potential(&self, cell: CellId) -> Result<i32> {
        self.potential
            .get(&cell)
            .copied()
            .ok_or(EvacError::InvalidPotential {
                cell,
                potential: self.id,
            })
    }

    /// Physical shortest-path length to the exit in metres
    pub fn distance(&self, cell: CellId) -> Result<f64> {
        self.distance
            .get(&cell)
            .copied()
            .ok_or(EvacError::InvalidPotential {
                cell,
                potential: self.id,
            })
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.potential.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.potential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.potential.is_empty()
    }

    pub fn max_potential(&self) -> i32 {
        self.max_potential
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Remove a cell from the field
    ///
    /// The maxima are recomputed from the remaining entries.
    pub fn remove(&mut self, cell: CellId) -> Option<i32> {
        let removed = self.potential.remove(&cell)?;
        self.distance.remove(&cell);
        self.max_potential = self.potential.values().copied().max().unwrap_or(0);
        self.max_distance = self.distance.values().copied().fold(0.0, f64::max);
        Some(removed)
    }

    /// Assigned cells in index order
    pub fn cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.potential.keys().copied().collect();
        cells.sort();
        cells
    }
}

/// Per-individual view of a static potential
///
/// Cells that cannot currently be entered, or that the field never reached,
/// read as `f64::INFINITY` so movement rules never pick them.
#[derive(Debug, Clone, Copy)]
pub struct EvacPotential<'a> {
    base: &'a StaticPotential,
    grid: &'a Grid,
}

impl<'a> EvacPotential<'a> {
    pub fn new(base: &'a StaticPotential, grid: &'a Grid) -> Self {
        Self { base, grid }
    }

    pub fn potential(&self, cell: CellId) -> f64 {
        let passable = self.grid.cell(cell).map(|c| c.is_passable()).unwrap_or(false);
        if !passable {
            return f64::INFINITY;
        }
        self.base
            .potential(cell)
            .map(f64::from)
            .unwrap_or(f64::INFINITY)
    }

    pub fn base(&self) -> &'a StaticPotential {
        self.base
    }
}
