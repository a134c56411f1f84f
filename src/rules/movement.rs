//! Movement rules
//!
//! Both movement rules share candidate filtering, crossing times and the
//! swap fallback; they only differ in how a target is picked.

use std::f64::consts::SQRT_2;

use rand::distributions::{Distribution, WeightedIndex};

use crate::actions::Action;
use crate::agent::AgentProperties;
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, Time};
use crate::grid::direction::Direction8;
use crate::grid::map::Grid;
use crate::potential::EvacPotential;
use crate::rules::{face_descent, Rule, RuleContext, RulePhase};

/// Largest exponent fed into Best-Response weights
const MAX_EXPONENT: f64 = 50.0;

pub trait MovementRule: Rule {
    /// Free cells the individual on `cell` may step to
    fn compute_targets(&self, cell: CellId, ctx: &RuleContext) -> Vec<(Direction8, CellId)> {
        movement_candidates(cell, ctx)
    }

    /// Pick one of `targets`; `None` means stay
    fn select_target(
        &self,
        cell: CellId,
        targets: &[(Direction8, CellId)],
        ctx: &mut RuleContext,
    ) -> Result<Option<(Direction8, CellId)>>;

    /// Whether the last execution moved or swapped the individual
    fn move_completed(&self) -> bool;
}

/// Alarmed, bound to an exit and done with its previous crossing
fn ready_to_move(cell: CellId, ctx: &RuleContext) -> bool {
    ctx.occupant(cell)
        .map(|(_, props)| props.alarmed && props.static_potential.is_some() && props.is_ready(ctx.time))
        .unwrap_or(false)
}

/// A diagonal step squeezing between two occupied cells
fn squeezes(grid: &Grid, cell: CellId, dir: Direction8) -> bool {
    let Some((a, b)) = dir.orthogonal_components() else {
        return false;
    };
    let occupied = |d: Direction8| {
        grid.neighbor(cell, d)
            .and_then(|n| grid.cell(n).ok())
            .map(|c| c.is_occupied())
            .unwrap_or(false)
    };
    occupied(a) && occupied(b)
}

/// Free neighbours within two turns of the heading
///
/// Door to door steps ignore the heading, safe individuals only stay on
/// save and exit cells.
pub fn movement_candidates(cell: CellId, ctx: &RuleContext) -> Vec<(Direction8, CellId)> {
    let grid = ctx.controller.grid();
    let Some((agent, props)) = ctx.occupant(cell) else {
        return Vec::new();
    };
    let Ok(origin) = grid.cell(cell) else {
        return Vec::new();
    };
    let safe = ctx.controller.agents().is_safe(agent);

    grid.neighbors(cell)
        .into_iter()
        .filter(|&(dir, target)| {
            let Ok(t) = grid.cell(target) else {
                return false;
            };
            let door_pass = origin.kind.is_door() && t.kind.is_door();
            !t.is_occupied()
                && (!safe || t.kind.is_safe_area())
                && !squeezes(grid, cell, dir)
                && (door_pass || props.direction.within_turn(dir, 2))
        })
        .collect()
}

fn crossing_time(ctx: &RuleContext, props: &AgentProperties, from: CellId, to: CellId, dir: Direction8, distance: f64) -> Result<(Time, Time)> {
    let grid = ctx.controller.grid();
    let origin = grid.cell(from)?;
    let target = grid.cell(to)?;

    let stair = origin.kind.stair_factor(origin.level(dir));
    let speed = props.relative_speed * ctx.sim.params().absolute_max_speed() * target.speed_factor * stair;
    if speed <= 0.0 {
        return Err(EvacError::InvariantViolation(format!("non-positive speed {} towards {}", speed, to)));
    }

    // sub-step movement carries on from the previous crossing unless the
    // individual has been standing for more than a step
    let start = if props.step_end_time + 1.0 < ctx.time {
        ctx.time
    } else {
        props.step_end_time
    };
    Ok((start, start + distance / speed))
}

fn step_distance(ctx: &RuleContext, from: CellId, to: CellId, dir: Direction8) -> Result<f64> {
    let grid = ctx.controller.grid();
    let origin = grid.cell(from)?;
    let target = grid.cell(to)?;
    Ok(if origin.room != target.room || origin.floor != target.floor {
        ctx.sim.config.room_crossing_distance
    } else if dir.is_diagonal() {
        SQRT_2
    } else {
        1.0
    })
}

/// Cross from `from` to `to` over a given distance
pub(crate) fn cross(
    ctx: &mut RuleContext,
    agent: AgentId,
    from: CellId,
    to: CellId,
    direction: Direction8,
    distance: f64,
) -> Result<Action> {
    let props = ctx.controller.agents().properties(agent)?.clone();
    let (start_time, end_time) = crossing_time(ctx, &props, from, to, direction, distance)?;

    if ctx.sim.config.use_dynamic_potential {
        ctx.emit(Action::DynamicPotentialChange { cell: from, delta: 1 })?;
    }
    ctx.stats.record_move(agent, from, to, start_time, end_time);

    Ok(Action::Move {
        agent,
        from,
        to,
        direction,
        start_time,
        end_time,
    })
}

/// Step to a neighbouring cell
pub fn perform_move(ctx: &mut RuleContext, agent: AgentId, from: CellId, to: CellId, direction: Direction8) -> Result<Action> {
    let distance = step_distance(ctx, from, to, direction)?;
    cross(ctx, agent, from, to, direction, distance)
}

/// Exchange places with the individual on `b`
pub fn perform_swap(ctx: &mut RuleContext, first: AgentId, a: CellId, b: CellId, direction: Direction8) -> Result<Action> {
    let second = ctx.agent_at(b).ok_or(EvacError::EmptyCell(b))?;
    let distance = step_distance(ctx, a, b, direction)?;

    let mut first_props = ctx.controller.agents().properties(first)?.clone();
    let mut second_props = ctx.controller.agents().properties(second)?.clone();
    // a swap always starts now for both
    first_props.step_end_time = ctx.time;
    second_props.step_end_time = ctx.time;
    let (_, end_time_first) = crossing_time(ctx, &first_props, a, b, direction, distance)?;
    let (_, end_time_second) = crossing_time(ctx, &second_props, b, a, direction.opposite(), distance)?;

    if ctx.sim.config.use_dynamic_potential {
        ctx.emit(Action::DynamicPotentialChange { cell: a, delta: 1 })?;
        ctx.emit(Action::DynamicPotentialChange { cell: b, delta: 1 })?;
    }
    ctx.controller.set_direction(first, direction)?;
    ctx.controller.set_direction(second, direction.opposite())?;
    ctx.stats.record_move(first, a, b, ctx.time, end_time_first);
    ctx.stats.record_move(second, b, a, ctx.time, end_time_second);

    Ok(Action::Swap {
        first,
        second,
        a,
        b,
        end_time_first,
        end_time_second,
    })
}

/// Stay for one step
pub fn wait(ctx: &mut RuleContext, agent: AgentId, cell: CellId) -> Result<()> {
    ctx.controller.set_step_times(agent, ctx.time, ctx.time + 1.0)?;
    ctx.stats.record_wait(agent, cell, ctx.time);
    Ok(())
}

/// A ready neighbour that wants this cell while we want its cell
fn swap_partner(cell: CellId, agent: AgentId, props: &AgentProperties, ctx: &RuleContext) -> Option<(Direction8, CellId)> {
    let grid = ctx.controller.grid();
    let potentials = ctx.controller.potentials();
    let own = EvacPotential::new(potentials.get(props.static_potential?).ok()?, grid);
    let here = own.potential(cell);
    let safe = ctx.controller.agents().is_safe(agent);

    grid.neighbors(cell)
        .into_iter()
        .filter(|&(dir, _)| props.direction.within_turn(dir, 2))
        .filter_map(|(dir, n)| {
            let target = grid.cell(n).ok()?;
            if safe && !target.kind.is_safe_area() {
                return None;
            }
            let other = target.occupant()?;
            if other == agent || ctx.controller.agents().is_safe(other) {
                return None;
            }
            let other_props = ctx.controller.agents().properties(other).ok()?;
            if !other_props.alarmed || !other_props.is_ready(ctx.time) {
                return None;
            }
            let theirs = EvacPotential::new(potentials.get(other_props.static_potential?).ok()?, grid);
            let ours_there = own.potential(n);
            (ours_there < here && theirs.potential(cell) < theirs.potential(n)).then_some((ours_there, dir, n))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.index().cmp(&b.1.index())))
        .map(|(_, dir, n)| (dir, n))
}

/// Move, swap or wait; shared by both movement rules
fn step<M: MovementRule + ?Sized>(rule: &M, cell: CellId, ctx: &mut RuleContext) -> Result<(bool, Option<Action>)> {
    let (agent, props) = ctx.occupant_or_err(cell)?;
    let targets = rule.compute_targets(cell, ctx);

    if let Some((dir, to)) = rule.select_target(cell, &targets, ctx)? {
        return Ok((true, Some(perform_move(ctx, agent, cell, to, dir)?)));
    }

    if targets.is_empty() {
        if let Some((dir, n)) = swap_partner(cell, agent, &props, ctx) {
            return Ok((true, Some(perform_swap(ctx, agent, cell, n, dir)?)));
        }
    }

    // standing still turns the individual towards the way out
    if let Some(potential) = props.static_potential {
        face_descent(ctx, agent, cell, potential)?;
    }
    wait(ctx, agent, cell)?;
    Ok((false, None))
}

/// Always take the free neighbour with the lowest potential
#[derive(Debug, Default, Clone)]
pub struct SimpleMovementRule {
    completed: bool,
}

impl SimpleMovementRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for SimpleMovementRule {
    fn name(&self) -> &'static str {
        "simple_movement"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn is_movement(&self) -> bool {
        true
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        ready_to_move(cell, ctx)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (completed, action) = step(&*self, cell, ctx)?;
        self.completed = completed;
        Ok(action)
    }

    fn as_movement(&self) -> Option<&dyn MovementRule> {
        Some(self)
    }
}

impl MovementRule for SimpleMovementRule {
    fn select_target(
        &self,
        cell: CellId,
        targets: &[(Direction8, CellId)],
        ctx: &mut RuleContext,
    ) -> Result<Option<(Direction8, CellId)>> {
        let (_, props) = ctx.occupant_or_err(cell)?;
        let Some(potential) = props.static_potential else {
            return Ok(None);
        };
        let view = EvacPotential::new(ctx.controller.potentials().get(potential)?, ctx.controller.grid());
        let here = view.potential(cell);

        let mut best: Option<(f64, Direction8, CellId)> = None;
        for &(dir, to) in targets {
            let value = view.potential(to);
            if value < here && best.map_or(true, |(b, _, _)| value < b) {
                best = Some((value, dir, to));
            }
        }
        Ok(best.map(|(_, dir, to)| (dir, to)))
    }

    fn move_completed(&self) -> bool {
        self.completed
    }
}

/// Draw a target with probability proportional to `exp` of its gain
///
/// The gain mixes the static and dynamic potential by panic:
/// `(1 − panic) · w_s · Δstatic / 10 + panic · w_d · Δdynamic`. Staying
/// put is a candidate with gain 0.
#[derive(Debug, Default, Clone)]
pub struct BestResponseMovementRule {
    completed: bool,
}

impl BestResponseMovementRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for BestResponseMovementRule {
    fn name(&self) -> &'static str {
        "best_response_movement"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn is_movement(&self) -> bool {
        true
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        ready_to_move(cell, ctx)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (completed, action) = step(&*self, cell, ctx)?;
        self.completed = completed;
        Ok(action)
    }

    fn as_movement(&self) -> Option<&dyn MovementRule> {
        Some(self)
    }
}

impl MovementRule for BestResponseMovementRule {
    fn select_target(
        &self,
        cell: CellId,
        targets: &[(Direction8, CellId)],
        ctx: &mut RuleContext,
    ) -> Result<Option<(Direction8, CellId)>> {
        if targets.is_empty() {
            return Ok(None);
        }
        let (_, props) = ctx.occupant_or_err(cell)?;
        let Some(potential) = props.static_potential else {
            return Ok(None);
        };

        let (options, weights) = {
            let params = ctx.sim.params();
            let w_static = params.static_potential_weight();
            let w_dynamic = params.dynamic_potential_weight();
            let view = EvacPotential::new(ctx.controller.potentials().get(potential)?, ctx.controller.grid());
            let dynamic = ctx.controller.potentials().dynamic();
            let static_here = view.potential(cell);
            let dynamic_here = dynamic.potential(cell);

            let mut options = vec![None];
            let mut weights = vec![1.0];
            for &(dir, to) in targets {
                let static_there = view.potential(to);
                if !static_there.is_finite() {
                    continue;
                }
                let delta_static = (static_here - static_there) / 10.0;
                let delta_dynamic = f64::from(dynamic.potential(to) - dynamic_here);
                let gain = (1.0 - props.panic) * w_static * delta_static + props.panic * w_dynamic * delta_dynamic;
                options.push(Some((dir, to)));
                weights.push(gain.clamp(-MAX_EXPONENT, MAX_EXPONENT).exp());
            }
            (options, weights)
        };

        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| EvacError::InvariantViolation(format!("best response weights on {}: {}", cell, e)))?;
        Ok(options[distribution.sample(ctx.sim.rng())])
    }

    fn move_completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Individual;
    use crate::core::config::SimulationConfig;
    use crate::grid::{parse_layout, CellKind, Level};
    use crate::rules::fixture::Fixture;

    fn deterministic() -> SimulationConfig {
        SimulationConfig {
            use_dynamic_potential: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_simple_move_towards_exit() {
        let layout = parse_layout("E.@").unwrap();
        let start = layout.starts[0];
        let middle = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();

        let mut rule = SimpleMovementRule::new();
        let action = fixture.run(&mut rule, start, 0.0);
        assert_eq!(
            action,
            Some(Action::Move {
                agent: id,
                from: start,
                to: middle,
                direction: Direction8::Left,
                start_time: 0.0,
                end_time: 1.0,
            })
        );
        assert!(rule.move_completed());
        assert_eq!(fixture.stats.utilization(middle), 1);

        // still crossing
        let ctx = fixture.ctx(0.5);
        assert!(!rule.executable_on(middle, &ctx));
    }

    #[test]
    fn test_slow_cell_takes_longer() {
        let layout = parse_layout("E.@").unwrap();
        let start = layout.starts[0];
        let middle = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut grid = layout.grid;
        grid.set_speed_factor(middle, 0.5).unwrap();
        let mut fixture = Fixture::new(grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();

        let action = fixture.run(&mut SimpleMovementRule::new(), start, 0.0);
        assert!(matches!(action, Some(Action::Move { end_time, .. }) if (end_time - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_blocked_individual_waits() {
        // only one cell leads to the exit below it
        let layout = parse_layout(".@.\n#E#").unwrap();
        let left = layout.grid.cell_at(0, 0, 0).unwrap();
        let right = layout.grid.cell_at(0, 2, 0).unwrap();
        let middle = layout.starts[0];
        let mut fixture = Fixture::new(layout.grid, deterministic());
        fixture.place(Individual::new(AgentId(0)), left);
        fixture.place(Individual::new(AgentId(1)), middle);
        fixture.controller.set_step_times(AgentId(1), 0.0, 1.0).unwrap();
        let id = fixture.place(Individual::new(AgentId(2)), right);

        let mut rule = SimpleMovementRule::new();
        assert_eq!(fixture.run(&mut rule, right, 0.0), None);
        assert!(!rule.move_completed());
        let props = fixture.controller.agents().properties(id).unwrap();
        assert_eq!(props.step_end_time, 1.0);
        assert_eq!(fixture.stats.waiting_steps(id), 1);
    }

    #[test]
    fn test_no_squeezing_between_two_individuals() {
        let layout = parse_layout("E.\n.@").unwrap();
        let start = layout.starts[0];
        let top = layout.grid.cell_at(0, 1, 0).unwrap();
        let left = layout.grid.cell_at(0, 0, 1).unwrap();
        let mut fixture = Fixture::new(layout.grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.place(Individual::new(AgentId(1)), top);
        fixture.place(Individual::new(AgentId(2)), left);
        fixture.controller.set_direction(id, Direction8::TopLeft).unwrap();

        let ctx = fixture.ctx(0.0);
        assert!(movement_candidates(start, &ctx).is_empty());
    }

    #[test]
    fn test_cells_behind_are_not_candidates() {
        let layout = parse_layout("E.@.").unwrap();
        let start = layout.starts[0];
        let front = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();
        fixture.place(Individual::new(AgentId(1)), front);
        fixture.controller.set_step_times(AgentId(1), 0.0, 1.0).unwrap();

        let ctx = fixture.ctx(0.0);
        assert!(movement_candidates(start, &ctx).is_empty());
    }

    #[test]
    fn test_best_response_never_steps_back() {
        let layout = parse_layout("E.@.").unwrap();
        let start = layout.starts[0];
        let front = layout.grid.cell_at(0, 1, 0).unwrap();

        for seed in 0..60 {
            let config = SimulationConfig {
                seed,
                ..deterministic()
            };
            let mut fixture = Fixture::new(layout.grid.clone(), config);
            let id = fixture.place(Individual::new(AgentId(0)), start);
            fixture.controller.set_direction(id, Direction8::Left).unwrap();
            fixture.place(Individual::new(AgentId(1)), front);
            fixture.controller.set_step_times(AgentId(1), 0.0, 1.0).unwrap();

            let mut rule = BestResponseMovementRule::new();
            assert_eq!(fixture.run(&mut rule, start, 0.0), None, "seed {}", seed);
            assert!(!rule.move_completed());
            assert_eq!(fixture.controller.agent_at(start), Some(id));
        }
    }

    #[test]
    fn test_boxed_in_individual_turns_towards_exit() {
        // facing the wall at the dead end of a corridor
        let layout = parse_layout("E..").unwrap();
        let end = layout.grid.cell_at(0, 2, 0).unwrap();
        let middle = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), end);
        fixture.controller.set_direction(id, Direction8::Right).unwrap();

        let mut rule = SimpleMovementRule::new();
        assert_eq!(fixture.run(&mut rule, end, 0.0), None);
        let props = fixture.controller.agents().properties(id).unwrap();
        assert_eq!(props.direction, Direction8::Left);

        let action = fixture.run(&mut rule, end, 1.0);
        assert!(matches!(action, Some(Action::Move { to, .. }) if to == middle));
    }

    fn stair_step(level: Level) -> Option<Action> {
        let layout = parse_layout("E.@").unwrap();
        let start = layout.starts[0];
        let mut grid = layout.grid;
        grid.set_kind(
            start,
            CellKind::Stair {
                up_factor: 0.5,
                down_factor: 0.8,
            },
        )
        .unwrap();
        grid.set_level(start, Direction8::Left, level).unwrap();
        let mut fixture = Fixture::new(grid, deterministic());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();
        fixture.run(&mut SimpleMovementRule::new(), start, 0.0)
    }

    #[test]
    fn test_stairs_slow_climbing_more_than_descending() {
        let up = stair_step(Level::Higher);
        assert!(matches!(up, Some(Action::Move { end_time, .. }) if (end_time - 2.0).abs() < 1e-9));

        let down = stair_step(Level::Lower);
        assert!(matches!(down, Some(Action::Move { end_time, .. }) if (end_time - 1.25).abs() < 1e-9));

        let flat = stair_step(Level::Equal);
        assert!(matches!(flat, Some(Action::Move { end_time, .. }) if (end_time - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_crossing_into_another_room_is_shorter() {
        let mut grid = Grid::new();
        let hall = grid.add_room(0, (0, 0), 2, 1).unwrap();
        let office = grid.add_room(0, (2, 0), 2, 1).unwrap();
        let exit = grid.room_cell(hall, 0, 0).unwrap();
        grid.set_kind(exit, CellKind::Exit { attractivity: 100 }).unwrap();
        let start = grid.room_cell(office, 0, 0).unwrap();
        let landing = grid.room_cell(hall, 1, 0).unwrap();

        let config = deterministic();
        let crossing = config.room_crossing_distance;
        let mut fixture = Fixture::new(grid, config);
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();

        let action = fixture.run(&mut SimpleMovementRule::new(), start, 0.0);
        match action {
            Some(Action::Move { to, end_time, .. }) => {
                assert_eq!(to, landing);
                assert!((end_time - crossing).abs() < 1e-9, "crossed in {}", end_time);
            }
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn test_swap_with_oncoming_individual() {
        let layout = parse_layout("E..E").unwrap();
        let a = layout.grid.cell_at(0, 1, 0).unwrap();
        let b = layout.grid.cell_at(0, 2, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, deterministic());
        // each is bound to the exit behind the other
        let first = fixture.place(Individual::new(AgentId(0)), a);
        let second = fixture.place(Individual::new(AgentId(1)), b);
        fixture.controller.set_static_potential(first, crate::core::types::PotentialId(1)).unwrap();
        fixture.controller.set_static_potential(second, crate::core::types::PotentialId(0)).unwrap();
        fixture.controller.set_direction(first, Direction8::Right).unwrap();
        fixture.controller.set_direction(second, Direction8::Left).unwrap();
        // exits are occupied so neither can step elsewhere
        let left_exit = fixture.controller.grid().cell_at(0, 0, 0).unwrap();
        let right_exit = fixture.controller.grid().cell_at(0, 3, 0).unwrap();
        fixture.place(Individual::new(AgentId(2)), left_exit);
        fixture.place(Individual::new(AgentId(3)), right_exit);

        let mut rule = SimpleMovementRule::new();
        let action = fixture.run(&mut rule, a, 0.0);
        assert!(matches!(action, Some(Action::Swap { first: AgentId(0), second: AgentId(1), .. })));
        assert!(rule.move_completed());
        assert_eq!(fixture.controller.agent_at(a), Some(second));
        assert_eq!(fixture.controller.agent_at(b), Some(first));
        assert!(fixture.controller.check_invariants().is_ok());
    }

    #[test]
    fn test_best_response_prefers_descent() {
        let layout = parse_layout("E.@..").unwrap();
        let start = layout.starts[0];
        let towards = layout.grid.cell_at(0, 1, 0).unwrap();

        let mut downhill = 0;
        for seed in 0..40 {
            let config = SimulationConfig {
                seed,
                ..deterministic()
            };
            let mut fixture = Fixture::new(layout.grid.clone(), config);
            let id = fixture.place(Individual::new(AgentId(0)), start);
            fixture.controller.set_direction(id, Direction8::Left).unwrap();
            if let Some(Action::Move { to, .. }) = fixture.run(&mut BestResponseMovementRule::new(), start, 0.0) {
                if to == towards {
                    downhill += 1;
                }
            }
        }
        // exp(3) for the step against exp(0) for staying
        assert!(downhill > 25);
    }

    #[test]
    fn test_dynamic_potential_left_behind() {
        let layout = parse_layout("E.@").unwrap();
        let start = layout.starts[0];
        let mut fixture = Fixture::new(layout.grid, SimulationConfig::default());
        let id = fixture.place(Individual::new(AgentId(0)), start);
        fixture.controller.set_direction(id, Direction8::Left).unwrap();

        fixture.run(&mut SimpleMovementRule::new(), start, 0.0);
        assert_eq!(fixture.controller.potentials().dynamic().potential(start), 1);
    }
}
