//! Save and evacuation

use crate::actions::Action;
use crate::core::error::Result;
use crate::core::types::CellId;
use crate::grid::CellKind;
use crate::rules::{Rule, RuleContext, RulePhase};

fn kind_matches(cell: CellId, ctx: &RuleContext, f: impl Fn(&CellKind) -> bool) -> bool {
    ctx.controller.grid().cell(cell).map(|c| f(&c.kind)).unwrap_or(false)
}

/// Reaching a save area makes an individual safe, it stays inside
#[derive(Debug, Default, Clone, Copy)]
pub struct SaveRule;

impl Rule for SaveRule {
    fn name(&self) -> &'static str {
        "save"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        kind_matches(cell, ctx, |k| matches!(k, CellKind::Save))
            && ctx
                .agent_at(cell)
                .map(|agent| !ctx.controller.agents().is_safe(agent))
                .unwrap_or(false)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, props) = ctx.occupant_or_err(cell)?;
        let time = props.step_end_time.max(ctx.time);
        tracing::debug!("{} is safe at {:.2}", agent, time);
        Ok(Some(Action::Save { agent, time }))
    }
}

/// Reaching an exit ends the individual's run
#[derive(Debug, Default, Clone, Copy)]
pub struct EvacuateRule;

impl Rule for EvacuateRule {
    fn name(&self) -> &'static str {
        "evacuate"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        kind_matches(cell, ctx, |k| k.is_exit()) && ctx.agent_at(cell).is_some()
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, props) = ctx.occupant_or_err(cell)?;
        // counted once the crossing onto the exit is complete
        let time = props.step_end_time.max(ctx.time);
        ctx.stats.record_evacuation(agent, time);
        Ok(Some(Action::Evacuate { agent, time }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Individual;
    use crate::core::config::SimulationConfig;
    use crate::core::types::AgentId;
    use crate::grid::parse_layout;
    use crate::rules::fixture::Fixture;

    #[test]
    fn test_save_once() {
        let layout = parse_layout("ES.").unwrap();
        let save = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, SimulationConfig::default());
        let id = fixture.place(Individual::new(AgentId(0)), save);

        assert_eq!(fixture.run(&mut SaveRule, save, 3.0), Some(Action::Save { agent: id, time: 3.0 }));
        assert!(fixture.controller.agents().is_safe(id));
        assert!(fixture.controller.agents().remaining().contains(&id));
        assert_eq!(fixture.run(&mut SaveRule, save, 4.0), None);
    }

    #[test]
    fn test_evacuate_on_exit() {
        let layout = parse_layout("E.").unwrap();
        let exit = layout.grid.cell_at(0, 0, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, SimulationConfig::default());
        let id = fixture.place(Individual::new(AgentId(0)), exit);
        fixture.controller.set_step_times(id, 1.0, 2.0).unwrap();

        assert_eq!(fixture.run(&mut EvacuateRule, exit, 1.0), Some(Action::Evacuate { agent: id, time: 2.0 }));
        assert!(fixture.controller.agents().evacuated().contains(&id));
        assert_eq!(fixture.controller.agent_at(exit), None);
        assert_eq!(fixture.stats.evacuation_time(id), Some(2.0));
    }

    #[test]
    fn test_nothing_on_plain_cells() {
        let layout = parse_layout("E.").unwrap();
        let cell = layout.grid.cell_at(0, 1, 0).unwrap();
        let mut fixture = Fixture::new(layout.grid, SimulationConfig::default());
        fixture.place(Individual::new(AgentId(0)), cell);
        assert_eq!(fixture.run(&mut SaveRule, cell, 0.0), None);
        assert_eq!(fixture.run(&mut EvacuateRule, cell, 0.0), None);
    }
}
