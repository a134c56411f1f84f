//! Static field computation
//!
//! Multi-source wavefront from every cell of an exit cluster. Each wave
//! assigns all still-unassigned neighbours of the previous wave. A cell
//! reached from several parents blends their candidates:
//!
//! `potential = round((3 * min + sum) / (3 + parents))`
//!
//! which damps the staircase artefacts of a plain min-of-parents search.
//! The physical distance is tracked alongside without damping.
//! Teleport cells are reached from their targets at orthogonal cost.

use std::collections::BTreeMap;

use crate::core::error::{EvacError, Result};
use crate::core::types::{CellId, PotentialId};
use crate::grid::cell::CellKind;
use crate::grid::exit::ExitCluster;
use crate::grid::map::Grid;
use crate::potential::static_potential::StaticPotential;

/// Potential cost of an orthogonal step
pub const ORTHOGONAL_COST: i32 = 10;
/// Potential cost of a diagonal step
pub const DIAGONAL_COST: i32 = 14;
/// Side length of a cell in metres
pub const CELL_LENGTH: f64 = 0.4;

const SMOOTHING_WEIGHT: f64 = 3.0;

pub fn compute_static_potential(grid: &Grid, cluster: &ExitCluster, id: PotentialId) -> Result<StaticPotential> {
    let mut field = StaticPotential::new(id, cluster.id, cluster.attractivity);

    for &cell in &cluster.cells {
        if field.contains(cell) {
            return Err(EvacError::MalformedExit { cell });
        }
        grid.cell(cell)?;
        field.set(cell, 0, 0.0)?;
    }

    // target -> teleport cells leading there
    let mut teleports: BTreeMap<CellId, Vec<CellId>> = BTreeMap::new();
    for cell in grid.cells() {
        if let CellKind::Teleport { targets } = &cell.kind {
            for &target in targets {
                teleports.entry(target).or_default().push(cell.id);
            }
        }
    }

    let mut frontier: Vec<CellId> = cluster.cells.clone();

    while !frontier.is_empty() {
        // candidate (potential, distance) per parent, keyed in cell order
        let mut candidates: BTreeMap<CellId, Vec<(i32, f64)>> = BTreeMap::new();

        for &parent in &frontier {
            let parent_potential = field.potential(parent)?;
            let parent_distance = field.distance(parent)?;
            let parent_is_door = grid.cell(parent)?.kind.is_door();

            for (dir, next) in grid.neighbors(parent) {
                if field.contains(next) {
                    continue;
                }
                let door_pair = parent_is_door && grid.cell(next)?.kind.is_door();
                let (cost, length) = if dir.is_diagonal() && !door_pair {
                    (DIAGONAL_COST, std::f64::consts::SQRT_2 * CELL_LENGTH)
                } else {
                    (ORTHOGONAL_COST, CELL_LENGTH)
                };
                candidates
                    .entry(next)
                    .or_default()
                    .push((parent_potential + cost, parent_distance + length));
            }

            for &source in teleports.get(&parent).map(Vec::as_slice).unwrap_or(&[]) {
                if !field.contains(source) {
                    candidates
                        .entry(source)
                        .or_default()
                        .push((parent_potential + ORTHOGONAL_COST, parent_distance + CELL_LENGTH));
                }
            }
        }

        let mut next_frontier = Vec::with_capacity(candidates.len());
        for (cell, options) in candidates {
            field.set(cell, smooth(&options), shortest(&options))?;
            next_frontier.push(cell);
        }
        frontier = next_frontier;
    }

    tracing::debug!(
        "{} from exit cluster {}: {} cells, max potential {}",
        id,
        cluster.id,
        field.len(),
        field.max_potential()
    );

    Ok(field)
}

fn smooth(options: &[(i32, f64)]) -> i32 {
    let min = options.iter().map(|o| o.0).min().unwrap_or(0);
    let sum: i64 = options.iter().map(|o| i64::from(o.0)).sum();
    let blended = (SMOOTHING_WEIGHT * f64::from(min) + sum as f64) / (SMOOTHING_WEIGHT + options.len() as f64);
    blended.round() as i32
}

fn shortest(options: &[(i32, f64)]) -> f64 {
    options.iter().map(|o| o.1).fold(f64::INFINITY, f64::min)
}
