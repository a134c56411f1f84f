//! Exit clusters - connected groups of exit cells sharing one potential

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::CellId;
use crate::grid::cell::CellKind;
use crate::grid::map::Grid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitCluster {
    pub id: u32,
    pub cells: Vec<CellId>,
    pub attractivity: u32,
    /// `None` means unbounded
    pub capacity: Option<u32>,
}

impl ExitCluster {
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }
}

/// Flood-fill adjacent exit cells into clusters
///
/// Clusters are grown through [`Grid::neighbor`], so two exit cells only
/// share a cluster when they are mutually reachable as direct neighbours.
/// Clusters are numbered in order of their lowest cell index.
pub fn discover_exit_clusters(grid: &Grid) -> Vec<ExitCluster> {
    let mut visited = vec![false; grid.len()];
    let mut clusters = Vec::new();

    for cell in grid.cells() {
        if visited[cell.id.0] || !cell.kind.is_exit() {
            continue;
        }

        let mut members = Vec::new();
        let mut attractivity = 0;
        let mut queue = VecDeque::from([cell.id]);
        visited[cell.id.0] = true;

        while let Some(current) = queue.pop_front() {
            members.push(current);
            if let Some(CellKind::Exit { attractivity: a }) = grid.cell(current).ok().map(|c| &c.kind) {
                attractivity = attractivity.max(*a);
            }

            for (_, next) in grid.neighbors(current) {
                let is_exit = grid.cell(next).map(|c| c.kind.is_exit()).unwrap_or(false);
                if is_exit && !visited[next.0] {
                    visited[next.0] = true;
                    queue.push_back(next);
                }
            }
        }

        members.sort();
        clusters.push(ExitCluster {
            id: clusters.len() as u32,
            cells: members,
            attractivity,
            capacity: None,
        });
    }

    clusters
}
