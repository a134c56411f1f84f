//! Actions - every state change a rule can cause, as a value

use serde::{Deserialize, Serialize};

use crate::agent::DeathCause;
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, PotentialId, RoomId, Time};
use crate::grid::direction::Direction8;
use crate::state::StateController;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Move {
        agent: AgentId,
        from: CellId,
        to: CellId,
        direction: Direction8,
        start_time: Time,
        end_time: Time,
    },
    /// `first` stands on `a`, `second` on `b`
    Swap {
        first: AgentId,
        second: AgentId,
        a: CellId,
        b: CellId,
        end_time_first: Time,
        end_time_second: Time,
    },
    Alarm {
        agent: AgentId,
        room: RoomId,
    },
    Save {
        agent: AgentId,
        time: Time,
    },
    Evacuate {
        agent: AgentId,
        time: Time,
    },
    Die {
        agent: AgentId,
        cause: DeathCause,
    },
    ChangePotential {
        agent: AgentId,
        potential: PotentialId,
    },
    DynamicPotentialChange {
        cell: CellId,
        delta: i32,
    },
    Void,
}

impl Action {
    /// Individual the action is about, if any
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Action::Move { agent, .. }
            | Action::Alarm { agent, .. }
            | Action::Save { agent, .. }
            | Action::Evacuate { agent, .. }
            | Action::Die { agent, .. }
            | Action::ChangePotential { agent, .. } => Some(*agent),
            Action::Swap { first, .. } => Some(*first),
            Action::DynamicPotentialChange { .. } | Action::Void => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Swap { .. } => "swap",
            Action::Alarm { .. } => "alarm",
            Action::Save { .. } => "save",
            Action::Evacuate { .. } => "evacuate",
            Action::Die { .. } => "die",
            Action::ChangePotential { .. } => "change_potential",
            Action::DynamicPotentialChange { .. } => "dynamic_potential_change",
            Action::Void => "void",
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(self, Action::Move { .. } | Action::Swap { .. })
    }
}

/// Execute an action against the state
///
/// Live runs and replays both go through here, so a replayed log passes
/// the same occupancy and lifecycle checks as the original run.
pub fn apply(action: &Action, controller: &mut StateController) -> Result<()> {
    match *action {
        Action::Move {
            agent,
            from,
            to,
            direction,
            start_time,
            end_time,
        } => {
            let occupant = controller.agent_at(from);
            if occupant != Some(agent) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} is not on {} (found {:?})",
                    agent, from, occupant
                )));
            }
            controller.move_agent(from, to)?;
            controller.set_direction(agent, direction)?;
            controller.set_step_times(agent, start_time, end_time)?;
            controller.set_occupied_until(to, end_time)
        }
        Action::Swap {
            first,
            second,
            a,
            b,
            end_time_first,
            end_time_second,
        } => {
            if controller.agent_at(a) != Some(first) || controller.agent_at(b) != Some(second) {
                return Err(EvacError::InvariantViolation(format!(
                    "swap of {} and {} does not match {} and {}",
                    first, second, a, b
                )));
            }
            let now = controller.time();
            controller.swap(a, b)?;
            controller.set_step_times(first, now, end_time_first)?;
            controller.set_step_times(second, now, end_time_second)?;
            controller.set_occupied_until(b, end_time_first)?;
            controller.set_occupied_until(a, end_time_second)
        }
        Action::Alarm { agent, room } => {
            controller.alarm(agent)?;
            controller.alarm_room(room)
        }
        Action::Save { agent, time } => controller.set_safe(agent, time),
        Action::Evacuate { agent, time } => controller.evacuate(agent, time),
        Action::Die { agent, cause } => controller.die(agent, cause),
        Action::ChangePotential { agent, potential } => controller.set_static_potential(agent, potential),
        Action::DynamicPotentialChange { cell, delta } => controller.change_dynamic_potential(cell, delta),
        Action::Void => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Individual;
    use crate::grid::parse_layout;
    use crate::potential::PotentialManager;

    fn controller() -> (StateController, Vec<CellId>) {
        let layout = parse_layout("E..").unwrap();
        let cells: Vec<CellId> = (0..3).map(|x| layout.grid.cell_at(0, x, 0).unwrap()).collect();
        let potentials = PotentialManager::from_grid(&layout.grid).unwrap();
        let mut controller = StateController::new(layout.grid, potentials);
        controller.add_agent(Individual::new(AgentId(0)), cells[2]).unwrap();
        (controller, cells)
    }

    #[test]
    fn test_apply_move() {
        let (mut controller, cells) = controller();
        let action = Action::Move {
            agent: AgentId(0),
            from: cells[2],
            to: cells[1],
            direction: Direction8::Left,
            start_time: 0.0,
            end_time: 1.0,
        };
        apply(&action, &mut controller).unwrap();

        let props = controller.agents().properties(AgentId(0)).unwrap();
        assert_eq!(props.cell, Some(cells[1]));
        assert_eq!(props.direction, Direction8::Left);
        assert_eq!(props.step_end_time, 1.0);
        assert_eq!(controller.grid().cell(cells[1]).unwrap().occupied_until(), 1.0);
    }

    #[test]
    fn test_apply_move_wrong_agent() {
        let (mut controller, cells) = controller();
        let action = Action::Move {
            agent: AgentId(9),
            from: cells[2],
            to: cells[1],
            direction: Direction8::Left,
            start_time: 0.0,
            end_time: 1.0,
        };
        assert!(apply(&action, &mut controller).unwrap_err().is_invariant());
    }

    #[test]
    fn test_apply_alarm_marks_room() {
        let (mut controller, _) = controller();
        let room = controller.grid().rooms()[0].id;
        apply(&Action::Alarm { agent: AgentId(0), room }, &mut controller).unwrap();
        assert!(controller.agents().properties(AgentId(0)).unwrap().alarmed);
        assert!(controller.grid().room(room).unwrap().is_alarmed());
    }

    #[test]
    fn test_void_and_names() {
        let (mut controller, _) = controller();
        apply(&Action::Void, &mut controller).unwrap();
        assert_eq!(Action::Void.name(), "void");
        assert_eq!(Action::Void.agent(), None);
        assert!(!Action::Void.is_movement());
    }
}
