//! Statistics hooks
//!
//! The engine reports what happened; aggregation for reports is left to
//! whoever implements the sink.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;

use crate::core::types::{AgentId, CellId, Time};

pub trait StatisticsSink {
    /// An individual started crossing from `from` to `to`
    fn record_move(&mut self, agent: AgentId, from: CellId, to: CellId, start: Time, end: Time);

    /// An individual stayed on `cell` for one step
    fn record_wait(&mut self, agent: AgentId, cell: CellId, time: Time);

    fn record_evacuation(&mut self, _agent: AgentId, _time: Time) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatistics;

impl StatisticsSink for NullStatistics {
    fn record_move(&mut self, _: AgentId, _: CellId, _: CellId, _: Time, _: Time) {}

    fn record_wait(&mut self, _: AgentId, _: CellId, _: Time) {}
}

/// Cell utilisation and waiting time counters
#[derive(Debug, Default, Clone)]
pub struct CellStatistics {
    utilization: AHashMap<CellId, u32>,
    waiting: BTreeMap<AgentId, u32>,
    evacuation_times: BTreeMap<AgentId, Time>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellStatisticsSummary {
    pub total_moves: u32,
    pub busiest_cell: Option<(CellId, u32)>,
    pub total_waiting_steps: u32,
    pub last_evacuation: Option<Time>,
}

impl CellStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `cell` was entered
    pub fn utilization(&self, cell: CellId) -> u32 {
        self.utilization.get(&cell).copied().unwrap_or(0)
    }

    pub fn waiting_steps(&self, agent: AgentId) -> u32 {
        self.waiting.get(&agent).copied().unwrap_or(0)
    }

    pub fn evacuation_time(&self, agent: AgentId) -> Option<Time> {
        self.evacuation_times.get(&agent).copied()
    }

    pub fn summary(&self) -> CellStatisticsSummary {
        let busiest_cell = self
            .utilization
            .iter()
            .map(|(&cell, &count)| (cell, count))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));

        CellStatisticsSummary {
            total_moves: self.utilization.values().sum(),
            busiest_cell,
            total_waiting_steps: self.waiting.values().sum(),
            last_evacuation: self.evacuation_times.values().copied().reduce(f64::max),
        }
    }
}

impl StatisticsSink for CellStatistics {
    fn record_move(&mut self, _agent: AgentId, _from: CellId, to: CellId, _start: Time, _end: Time) {
        *self.utilization.entry(to).or_insert(0) += 1;
    }

    fn record_wait(&mut self, agent: AgentId, _cell: CellId, _time: Time) {
        *self.waiting.entry(agent).or_insert(0) += 1;
    }

    fn record_evacuation(&mut self, agent: AgentId, time: Time) {
        self.evacuation_times.insert(agent, time);
    }
}
