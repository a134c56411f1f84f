//! Occupancy, lifecycle and rule set invariants over whole runs

use evac_ca::agent::{DeathCause, Individual, Lifecycle};
use evac_ca::core::types::AgentId;
use evac_ca::core::MovementPolicy;
use evac_ca::grid::{parse_layout, CellKind, Grid};
use evac_ca::rules::{RuleSet, SimpleMovementRule};
use evac_ca::simulation::AgentOrder;
use evac_ca::{EvacError, Simulation, SimulationConfig};

#[test]
fn test_invariants_hold_every_step() {
    let layout = parse_layout(
        "
#########
#@@@.@@@#
#@.....@D.E
#@@@.@@@#
#########",
    )
    .unwrap();
    let individuals = layout.starts.len();
    let mut sim = Simulation::new(layout.grid, SimulationConfig::default()).unwrap();
    for (i, &cell) in layout.starts.iter().enumerate() {
        sim.add_individual(Individual::new(AgentId(i as u32)), cell).unwrap();
    }
    sim.initialize().unwrap();

    while !sim.is_finished() {
        let result = sim.run_step().unwrap();
        sim.controller().check_invariants().unwrap();

        let agents = sim.controller().agents();
        assert_eq!(result.agents_remaining, agents.remaining().len());
        // every individual is in exactly one of remaining, dead, evacuated
        assert_eq!(
            agents.remaining().len() + agents.dead().len() + agents.evacuated().len(),
            individuals
        );
        // no two individuals share a cell
        let mut cells: Vec<_> = agents
            .remaining()
            .iter()
            .map(|&id| agents.properties(id).unwrap().cell.unwrap())
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), agents.remaining().len());
    }

    let summary = sim.summary();
    assert_eq!(summary.evacuated + summary.died_not_enough_time, individuals);
}

#[test]
fn test_evacuated_individuals_stay_out() {
    let layout = parse_layout("E..@.@").unwrap();
    let config = SimulationConfig {
        movement: MovementPolicy::Deterministic,
        agent_order: AgentOrder::FrontToBack,
        ..Default::default()
    };
    let mut sim = Simulation::new(layout.grid, config).unwrap();
    sim.add_individual(Individual::new(AgentId(0)), layout.starts[0]).unwrap();
    sim.add_individual(Individual::new(AgentId(1)), layout.starts[1]).unwrap();
    sim.run().unwrap();

    for id in [AgentId(0), AgentId(1)] {
        let props = sim.controller().agents().properties(id).unwrap();
        assert!(matches!(props.lifecycle, Lifecycle::Evacuated(_)));
        assert_eq!(props.cell, None);
        assert!(props.safe_time.is_some());
    }
    assert!(sim.controller().grid().cells().all(|c| !c.is_occupied()));
}

#[test]
fn test_second_movement_rule_is_rejected() {
    let mut rules = RuleSet::standard(&SimulationConfig::default());
    let err = rules.add(Box::new(SimpleMovementRule::new())).unwrap_err();
    assert!(matches!(err, EvacError::DuplicateMovementRule { .. }));
    assert!(err.is_configuration());
}

#[test]
fn test_stranded_individuals_die_at_the_step_limit() {
    let layout = parse_layout("E....................@").unwrap();
    let config = SimulationConfig {
        max_steps: 5,
        movement: MovementPolicy::Deterministic,
        ..Default::default()
    };
    let mut sim = Simulation::new(layout.grid, config).unwrap();
    sim.add_individual(Individual::new(AgentId(0)), layout.starts[0]).unwrap();
    let summary = sim.run().unwrap();

    assert_eq!(summary.steps, 5);
    assert_eq!(summary.died_not_enough_time, 1);
    let props = sim.controller().agents().properties(AgentId(0)).unwrap();
    assert_eq!(props.death_cause, Some(DeathCause::NotEnoughTime));
    assert!(sim.controller().agents().remaining().is_empty());
}

/// Floor 0 leads through a teleport to floor 1, which holds the exit
fn two_floors() -> (Grid, Vec<evac_ca::core::types::CellId>) {
    let mut grid = Grid::new();
    let lower = grid.add_room(0, (0, 0), 3, 1).unwrap();
    let upper = grid.add_room(1, (0, 0), 3, 1).unwrap();
    let teleport = grid.room_cell(lower, 2, 0).unwrap();
    let landing = grid.room_cell(upper, 2, 0).unwrap();
    let exit = grid.room_cell(upper, 0, 0).unwrap();
    grid.set_kind(exit, CellKind::Exit { attractivity: 100 }).unwrap();
    grid.set_kind(teleport, CellKind::Teleport { targets: vec![landing] }).unwrap();
    let starts = vec![
        grid.room_cell(lower, 0, 0).unwrap(),
        grid.room_cell(lower, 1, 0).unwrap(),
    ];
    (grid, starts)
}

#[test]
fn test_teleport_carries_individuals_between_floors() {
    let (grid, starts) = two_floors();
    let config = SimulationConfig {
        movement: MovementPolicy::Deterministic,
        agent_order: AgentOrder::FrontToBack,
        use_dynamic_potential: false,
        ..Default::default()
    };
    let mut sim = Simulation::new(grid, config).unwrap();
    for (i, &cell) in starts.iter().enumerate() {
        sim.add_individual(Individual::new(AgentId(i as u32)), cell).unwrap();
    }

    let summary = sim.run().unwrap();
    assert_eq!(summary.evacuated, 2);
    assert_eq!(summary.died_exit_unreachable, 0);
}

#[test]
fn test_unknown_teleport_target_is_rejected() {
    let mut grid = Grid::new();
    let room = grid.add_room(0, (0, 0), 2, 1).unwrap();
    let cell = grid.room_cell(room, 1, 0).unwrap();
    let err = grid
        .set_kind(cell, CellKind::Teleport { targets: vec![evac_ca::core::types::CellId(99)] })
        .unwrap_err();
    assert!(err.is_configuration());
}
