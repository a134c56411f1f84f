//! Processing order of individuals within a phase

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::AgentId;
use crate::state::StateController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOrder {
    /// Ascending id
    ArrayOrder,
    /// Fresh shuffle every phase
    #[default]
    RandomPermutation,
    /// Closest to its exit first
    FrontToBack,
    /// Farthest from its exit first
    BackToFront,
}

impl AgentOrder {
    /// Order `agents` for one phase; ties always break by id
    pub fn arrange<R: Rng>(self, agents: &[AgentId], controller: &StateController, rng: &mut R) -> Vec<AgentId> {
        let mut ordered = agents.to_vec();
        ordered.sort();

        match self {
            AgentOrder::ArrayOrder => {}
            AgentOrder::RandomPermutation => ordered.shuffle(rng),
            AgentOrder::FrontToBack => {
                ordered.sort_by_key(|&id| (OrderedFloat(exit_distance(controller, id)), id));
            }
            AgentOrder::BackToFront => {
                ordered.sort_by_key(|&id| (std::cmp::Reverse(OrderedFloat(exit_distance(controller, id))), id));
            }
        }
        ordered
    }
}

/// Real distance to the exit of the individual's static potential
fn exit_distance(controller: &StateController, agent: AgentId) -> f64 {
    let Ok(props) = controller.agents().properties(agent) else {
        return f64::INFINITY;
    };
    let (Some(cell), Some(potential)) = (props.cell, props.static_potential) else {
        return f64::INFINITY;
    };
    controller
        .potentials()
        .get(potential)
        .and_then(|p| p.distance(cell))
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Individual;
    use crate::core::types::{CellId, PotentialId};
    use crate::grid::parse_layout;
    use crate::potential::PotentialManager;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn corridor() -> StateController {
        let layout = parse_layout("E....").unwrap();
        let cells: Vec<CellId> = (0..5).map(|x| layout.grid.cell_at(0, x, 0).unwrap()).collect();
        let potentials = PotentialManager::from_grid(&layout.grid).unwrap();
        let mut controller = StateController::new(layout.grid, potentials);
        // id 0 farthest, id 2 closest
        for (id, x) in [(0, 4), (1, 3), (2, 1)] {
            controller.add_agent(Individual::new(AgentId(id)), cells[x]).unwrap();
            controller.set_static_potential(AgentId(id), PotentialId(0)).unwrap();
        }
        controller
    }

    #[test]
    fn test_distance_orders() {
        let controller = corridor();
        let agents = [AgentId(1), AgentId(0), AgentId(2)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert_eq!(
            AgentOrder::ArrayOrder.arrange(&agents, &controller, &mut rng),
            vec![AgentId(0), AgentId(1), AgentId(2)]
        );
        assert_eq!(
            AgentOrder::FrontToBack.arrange(&agents, &controller, &mut rng),
            vec![AgentId(2), AgentId(1), AgentId(0)]
        );
        assert_eq!(
            AgentOrder::BackToFront.arrange(&agents, &controller, &mut rng),
            vec![AgentId(0), AgentId(1), AgentId(2)]
        );
    }

    #[test]
    fn test_random_order_is_seeded() {
        let controller = corridor();
        let agents = [AgentId(0), AgentId(1), AgentId(2)];
        let a = AgentOrder::RandomPermutation.arrange(&agents, &controller, &mut ChaCha8Rng::seed_from_u64(5));
        let b = AgentOrder::RandomPermutation.arrange(&agents, &controller, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }
}
