//! Training-facing metrics
//!
//! [`Report`] is the named-scalar surface the caller forwards to its own
//! logging sink; the engine only fills it, transport is out of scope.
//! [`EpisodeMetrics`] collects per-episode statistics for the trainer.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::state::Team;

// ============================================================================
// Report
// ============================================================================

/// Named numeric accumulators for one reporting interval
///
/// `add` accumulates a sum; `add_avg` accumulates a running average.
/// Keys use `Category/Name` paths (`Rewards/air`, `Player/Speed`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    sums: HashMap<String, f64>,
    averages: HashMap<String, (f64, u64)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate into a summed metric
    pub fn add(&mut self, key: impl Into<String>, value: f64) {
        *self.sums.entry(key.into()).or_insert(0.0) += value;
    }

    /// Accumulate one sample into an averaged metric
    pub fn add_avg(&mut self, key: impl Into<String>, value: f64) {
        let entry = self.averages.entry(key.into()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    pub fn sum(&self, key: &str) -> Option<f64> {
        self.sums.get(key).copied()
    }

    pub fn avg(&self, key: &str) -> Option<f64> {
        self.averages.get(key).map(|(total, count)| {
            if *count == 0 {
                0.0
            } else {
                total / *count as f64
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty() && self.averages.is_empty()
    }

    /// All metrics flattened to `(key, value)`, sorted by key for stable
    /// output
    pub fn to_sorted_vec(&self) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = self
            .sums
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .chain(self.averages.keys().map(|k| (k.clone(), self.avg(k).unwrap_or(0.0))))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn clear(&mut self) {
        self.sums.clear();
        self.averages.clear();
    }
}

// ============================================================================
// Episode metrics
// ============================================================================

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Still running
    #[default]
    InProgress,
    GoalScored,
    TimeUp,
    /// No player touched the ball for the configured timeout
    NoTouch,
}

impl TerminationReason {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminationReason::InProgress)
    }
}

/// Per-episode statistics for RL training
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    /// Total ticks evaluated this episode
    pub total_ticks: u64,
    /// Simulator tick index of the most recently evaluated snapshot
    pub last_tick_count: u64,
    /// Cumulative aggregated reward per car id
    pub cumulative_reward: FxHashMap<u32, f32>,
    /// Goals this episode (blue, orange)
    pub goals: (u32, u32),
    /// Ball touches across all agents
    pub touches: u64,
    pub termination_reason: TerminationReason,
}

impl EpisodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one agent's aggregated reward for the current tick
    pub fn record_reward(&mut self, car_id: u32, reward: f32) {
        *self.cumulative_reward.entry(car_id).or_insert(0.0) += reward;
    }

    /// Advance the tick counter once per evaluated tick
    ///
    /// `tick_count` is the simulator's tick index for the snapshot, kept so
    /// the trainer can cross-reference episode stats against replay frames.
    pub fn record_tick(&mut self, tick_count: u64) {
        self.total_ticks += 1;
        self.last_tick_count = tick_count;
    }

    pub fn record_touch(&mut self) {
        self.touches += 1;
    }

    pub fn record_goal(&mut self, team: Team) {
        match team {
            Team::Blue => self.goals.0 += 1,
            Team::Orange => self.goals.1 += 1,
        }
    }

    pub fn set_termination(&mut self, reason: TerminationReason) {
        self.termination_reason = reason;
    }

    pub fn cumulative_reward_for(&self, car_id: u32) -> f32 {
        self.cumulative_reward.get(&car_id).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
