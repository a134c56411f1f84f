//! Property tests for the potential fields and whole runs

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use evac_ca::agent::Individual;
use evac_ca::core::types::{AgentId, CellId};
use evac_ca::grid::{CellKind, Grid};
use evac_ca::potential::{DynamicPotential, PotentialManager};
use evac_ca::{Simulation, SimulationConfig};

/// Rectangular room with one exit cell
fn room_with_exit(width: u32, height: u32, exit: (u32, u32)) -> Grid {
    let mut grid = Grid::new();
    let room = grid.add_room(0, (0, 0), width, height).unwrap();
    let cell = grid.room_cell(room, exit.0 as i32, exit.1 as i32).unwrap();
    grid.set_kind(cell, CellKind::Exit { attractivity: 100 }).unwrap();
    grid
}

fn room_strategy() -> impl Strategy<Value = (u32, u32, (u32, u32))> {
    (1u32..10, 1u32..10).prop_flat_map(|(w, h)| (Just(w), Just(h), (0..w, 0..h)))
}

#[derive(Debug, Clone)]
enum DynamicOp {
    Increase(usize),
    Decrease(usize),
    Delta(usize, i32),
    Update(u64),
}

fn dynamic_op() -> impl Strategy<Value = DynamicOp> {
    prop_oneof![
        (0usize..6).prop_map(DynamicOp::Increase),
        (0usize..6).prop_map(DynamicOp::Decrease),
        (0usize..6, -5i32..5).prop_map(|(c, d)| DynamicOp::Delta(c, d)),
        any::<u64>().prop_map(DynamicOp::Update),
    ]
}

proptest! {
    #[test]
    fn prop_every_cell_has_a_way_down((width, height, exit) in room_strategy()) {
        let grid = room_with_exit(width, height, exit);
        let manager = PotentialManager::from_grid(&grid).unwrap();
        prop_assert_eq!(manager.statics().len(), 1);
        let field = &manager.statics()[0];

        // a single open room is reached everywhere
        prop_assert_eq!(field.len(), grid.len());

        for cell in grid.cells().filter(|c| !c.kind.is_exit()) {
            let value = field.potential(cell.id).unwrap();
            prop_assert!(value > 0);
            let lower = grid
                .neighbors(cell.id)
                .into_iter()
                .any(|(_, n)| field.potential(n).map(|v| v < value).unwrap_or(false));
            prop_assert!(lower, "{} ({}) has no lower neighbour", cell.id, value);
        }
    }

    #[test]
    fn prop_dynamic_potential_never_negative(ops in prop::collection::vec(dynamic_op(), 0..60)) {
        let mut dynamic = DynamicPotential::new();
        for op in ops {
            match op {
                DynamicOp::Increase(c) => dynamic.increase(CellId(c)),
                DynamicOp::Decrease(c) => dynamic.decrease(CellId(c)),
                DynamicOp::Delta(c, d) => dynamic.apply_delta(CellId(c), d),
                DynamicOp::Update(seed) => {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    dynamic.update(0.3, 0.5, &mut rng);
                }
            }
            for c in 0..6 {
                prop_assert!(dynamic.potential(CellId(c)) >= 0);
            }
        }
        prop_assert!(dynamic.max_potential() >= 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_runs_keep_invariants(seed in any::<u64>(), (width, height, exit) in room_strategy()) {
        let grid = room_with_exit(width, height, exit);
        let exit_cell = grid.cells().find(|c| c.kind.is_exit()).map(|c| c.id).unwrap();
        let starts: Vec<CellId> = grid.cells().map(|c| c.id).filter(|&c| c != exit_cell).step_by(2).collect();

        let config = SimulationConfig { seed, max_steps: 200, ..Default::default() };
        let mut sim = Simulation::new(grid, config).unwrap();
        for (i, &cell) in starts.iter().enumerate() {
            sim.add_individual(Individual::new(AgentId(i as u32)), cell).unwrap();
        }

        let summary = sim.run().unwrap();
        sim.controller().check_invariants().unwrap();
        prop_assert_eq!(summary.individuals, starts.len());
        prop_assert_eq!(summary.evacuated + summary.died_not_enough_time, starts.len());
        prop_assert!(summary.steps <= 200);
    }
}
