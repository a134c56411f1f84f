//! Ownership of every potential used by a run

use crate::core::error::{EvacError, Result};
use crate::core::types::{CellId, PotentialId};
use crate::grid::map::Grid;
use crate::potential::dynamic::DynamicPotential;
use crate::potential::field::compute_static_potential;
use crate::potential::static_potential::StaticPotential;

#[derive(Debug, Clone, Default)]
pub struct PotentialManager {
    statics: Vec<StaticPotential>,
    dynamic: DynamicPotential,
}

impl PotentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// One static potential per exit cluster of the grid
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let mut manager = Self::new();
        for cluster in grid.exit_clusters() {
            let id = PotentialId(manager.statics.len() as u32);
            manager.statics.push(compute_static_potential(grid, &cluster, id)?);
        }
        tracing::info!("Computed {} static potentials", manager.statics.len());
        Ok(manager)
    }

    pub fn add(&mut self, mut potential: StaticPotential) -> PotentialId {
        let id = PotentialId(self.statics.len() as u32);
        potential.id = id;
        self.statics.push(potential);
        id
    }

    pub fn get(&self, id: PotentialId) -> Result<&StaticPotential> {
        self.statics
            .get(id.0 as usize)
            .ok_or(EvacError::UnknownPotential(id))
    }

    pub fn statics(&self) -> &[StaticPotential] {
        &self.statics
    }

    /// Static potentials that reach `cell`
    pub fn reaching(&self, cell: CellId) -> impl Iterator<Item = &StaticPotential> {
        self.statics.iter().filter(move |p| p.contains(cell))
    }

    /// Potential with the lowest value at `cell`; ties go to the lower id
    pub fn nearest(&self, cell: CellId) -> Option<PotentialId> {
        self.reaching(cell)
            .filter_map(|p| p.potential(cell).ok().map(|v| (v, p.id)))
            .min()
            .map(|(_, id)| id)
    }

    pub fn dynamic(&self) -> &DynamicPotential {
        &self.dynamic
    }

    pub(crate) fn dynamic_mut(&mut self) -> &mut DynamicPotential {
        &mut self.dynamic
    }
}
