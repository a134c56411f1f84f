//! Rooms group cells on one floor

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, CellId, FloorId, RoomId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor: FloorId,
    pub offset: (i32, i32),
    pub width: u32,
    pub height: u32,
    cells: Vec<CellId>,
    alarmed: bool,
    agents: Vec<AgentId>,
}

impl Room {
    pub fn new(id: RoomId, floor: FloorId, offset: (i32, i32), width: u32, height: u32) -> Self {
        Self {
            id,
            floor,
            offset,
            width,
            height,
            cells: Vec::new(),
            alarmed: false,
            agents: Vec::new(),
        }
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn is_alarmed(&self) -> bool {
        self.alarmed
    }

    pub(crate) fn push_cell(&mut self, cell: CellId) {
        self.cells.push(cell);
    }

    pub(crate) fn set_alarmed(&mut self, alarmed: bool) {
        self.alarmed = alarmed;
    }

    pub(crate) fn add_agent(&mut self, agent: AgentId) {
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    pub(crate) fn remove_agent(&mut self, agent: AgentId) {
        self.agents.retain(|&a| a != agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_membership_is_a_set() {
        let mut room = Room::new(RoomId(0), 0, (0, 0), 3, 3);
        room.add_agent(AgentId(1));
        room.add_agent(AgentId(1));
        room.add_agent(AgentId(2));
        assert_eq!(room.agents(), &[AgentId(1), AgentId(2)]);

        room.remove_agent(AgentId(1));
        assert_eq!(room.agents(), &[AgentId(2)]);
    }
}
