//! Agent state store - property records and lifecycle bookkeeping
//!
//! Lifecycle sets are ordered so that every iteration over them is
//! deterministic. Transitions only go one way: an individual that left
//! `remaining` never returns.

use std::collections::{BTreeMap, BTreeSet};

use crate::agent::individual::Individual;
use crate::agent::properties::{AgentProperties, AgentPropertySnapshot, DeathCause, Lifecycle};
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, Time};

#[derive(Debug, Clone, Default)]
pub struct AgentStore {
    individuals: BTreeMap<AgentId, Individual>,
    properties: BTreeMap<AgentId, AgentProperties>,
    initial: BTreeSet<AgentId>,
    remaining: BTreeSet<AgentId>,
    dead: BTreeSet<AgentId>,
    safe: BTreeSet<AgentId>,
    evacuated: BTreeSet<AgentId>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, individual: Individual, cell: CellId) -> Result<()> {
        let id = individual.id;
        if self.individuals.contains_key(&id) {
            return Err(EvacError::InvariantViolation(format!("{} added twice", id)));
        }
        self.properties.insert(id, AgentProperties::new(&individual, cell));
        self.individuals.insert(id, individual);
        self.initial.insert(id);
        self.remaining.insert(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individual(&self, id: AgentId) -> Result<&Individual> {
        self.individuals.get(&id).ok_or(EvacError::UnknownAgent(id))
    }

    pub fn properties(&self, id: AgentId) -> Result<&AgentProperties> {
        self.properties.get(&id).ok_or(EvacError::UnknownAgent(id))
    }

    pub(crate) fn properties_mut(&mut self, id: AgentId) -> Result<&mut AgentProperties> {
        self.properties.get_mut(&id).ok_or(EvacError::UnknownAgent(id))
    }

    pub fn snapshot(&self, id: AgentId) -> Result<AgentPropertySnapshot> {
        Ok(AgentPropertySnapshot {
            id,
            individual: self.individual(id)?.clone(),
            properties: self.properties(id)?.clone(),
        })
    }

    pub fn initial(&self) -> &BTreeSet<AgentId> {
        &self.initial
    }

    pub fn remaining(&self) -> &BTreeSet<AgentId> {
        &self.remaining
    }

    pub fn dead(&self) -> &BTreeSet<AgentId> {
        &self.dead
    }

    pub fn safe(&self) -> &BTreeSet<AgentId> {
        &self.safe
    }

    pub fn evacuated(&self) -> &BTreeSet<AgentId> {
        &self.evacuated
    }

    pub fn is_safe(&self, id: AgentId) -> bool {
        self.safe.contains(&id)
    }

    /// Individuals still inside and not yet safe
    pub fn not_safe_remaining(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.remaining.iter().copied().filter(move |id| !self.safe.contains(id))
    }

    pub(crate) fn mark_dead(&mut self, id: AgentId, cause: DeathCause) -> Result<()> {
        let props = self.properties.get_mut(&id).ok_or(EvacError::UnknownAgent(id))?;
        if props.death_cause.is_some() {
            return Err(EvacError::DeathCauseAlreadySet(id));
        }
        if !self.remaining.remove(&id) {
            return Err(EvacError::AgentNotInSet {
                agent: id,
                set: "remaining",
            });
        }
        props.death_cause = Some(cause);
        props.lifecycle = Lifecycle::Dead(cause);
        props.cell = None;
        self.dead.insert(id);
        Ok(())
    }

    pub(crate) fn mark_safe(&mut self, id: AgentId, time: Time) -> Result<()> {
        if !self.remaining.contains(&id) {
            return Err(EvacError::AgentNotInSet {
                agent: id,
                set: "remaining",
            });
        }
        let props = self.properties.get_mut(&id).ok_or(EvacError::UnknownAgent(id))?;
        if props.safe_time.is_none() {
            props.safe_time = Some(time);
        }
        self.safe.insert(id);
        Ok(())
    }

    pub(crate) fn mark_evacuated(&mut self, id: AgentId, time: Time) -> Result<()> {
        self.mark_safe(id, time)?;
        self.remaining.remove(&id);
        let props = self.properties.get_mut(&id).ok_or(EvacError::UnknownAgent(id))?;
        props.lifecycle = Lifecycle::Evacuated(time);
        props.cell = None;
        self.evacuated.insert(id);
        Ok(())
    }

    /// Every individual is in exactly one of remaining / dead / evacuated,
    /// and evacuated implies safe
    pub fn check_lifecycle(&self) -> Result<()> {
        for &id in &self.initial {
            let memberships = [
                self.remaining.contains(&id),
                self.dead.contains(&id),
                self.evacuated.contains(&id),
            ]
            .iter()
            .filter(|&&m| m)
            .count();
            if memberships != 1 {
                return Err(EvacError::InvariantViolation(format!(
                    "{} is in {} of remaining/dead/evacuated",
                    id, memberships
                )));
            }
            if self.evacuated.contains(&id) && !self.safe.contains(&id) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} evacuated without being safe",
                    id
                )));
            }
        }
        Ok(())
    }
}
