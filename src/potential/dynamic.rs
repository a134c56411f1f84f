//! Dynamic potential - global, decaying memory of crowd movement

use ahash::{AHashMap, AHashSet};
use rand::Rng;

use crate::core::types::CellId;

#[derive(Debug, Clone, Default)]
pub struct DynamicPotential {
    values: AHashMap<CellId, i32>,
    /// Cells increased since the last `update`
    marked: AHashSet<CellId>,
}

impl DynamicPotential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a cell; untouched cells are 0
    pub fn potential(&self, cell: CellId) -> i32 {
        self.values.get(&cell).copied().unwrap_or(0)
    }

    /// Largest value in the field, never below 0
    pub fn max_potential(&self) -> i32 {
        self.values.values().copied().max().unwrap_or(0).max(0)
    }

    /// A cell was crossed
    pub fn increase(&mut self, cell: CellId) {
        *self.values.entry(cell).or_insert(0) += 1;
        self.marked.insert(cell);
    }

    pub fn decrease(&mut self, cell: CellId) {
        self.apply_delta(cell, -1);
    }

    /// Add `delta`, flooring at 0
    pub fn apply_delta(&mut self, cell: CellId, delta: i32) {
        let value = (self.potential(cell) + delta).max(0);
        if value == 0 {
            self.values.remove(&cell);
        } else {
            self.values.insert(cell, value);
        }
    }

    /// Positive cells in index order
    pub fn active_cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self
            .values
            .iter()
            .filter(|(_, &v)| v > 0)
            .map(|(&c, _)| c)
            .collect();
        cells.sort();
        cells
    }

    /// Stochastic diffusion and decay, once per step
    ///
    /// Positive cells that were not crossed this step gain 1 with
    /// probability `p_inc`; afterwards every positive cell loses 1 with
    /// probability `p_dec`. Returns the net change per cell, in cell order.
    pub fn update<R: Rng>(&mut self, p_inc: f64, p_dec: f64, rng: &mut R) -> Vec<(CellId, i32)> {
        let cells = self.active_cells();
        let mut deltas = Vec::new();

        for cell in cells {
            let mut delta = 0;
            if !self.marked.contains(&cell) && rng.gen_bool(p_inc) {
                delta += 1;
            }
            if self.potential(cell) + delta > 0 && rng.gen_bool(p_dec) {
                delta -= 1;
            }
            if delta != 0 {
                self.apply_delta(cell, delta);
                deltas.push((cell, delta));
            }
        }

        self.marked.clear();
        deltas
    }
}
