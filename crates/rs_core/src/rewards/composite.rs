//! Weighted reward aggregation
//!
//! The seam between the component set and the external trainer: an
//! ordered list of `(component, weight)` pairs whose weighted sum is the
//! agent's total reward for the tick. Which components are active and at
//! what weight is environment configuration ([`crate::config`]), not part
//! of the scoring units themselves.

use crate::metrics::Report;
use crate::state::{GameState, Player, Step};

use super::RewardFunction;

/// Ordered weighted set of reward components
#[derive(Default)]
pub struct WeightedRewards {
    entries: Vec<(Box<dyn RewardFunction>, f32)>,
}

impl WeightedRewards {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a component with its weight
    pub fn add(mut self, func: Box<dyn RewardFunction>, weight: f32) -> Self {
        self.entries.push((func, weight));
        self
    }

    /// Add a component with its weight (`&mut` variant)
    pub fn add_mut(&mut self, func: Box<dyn RewardFunction>, weight: f32) -> &mut Self {
        self.entries.push((func, weight));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reset every component for a new episode
    pub fn reset(&mut self, initial: &GameState) {
        for (func, _) in &mut self.entries {
            func.reset(initial);
        }
    }

    /// Weighted sum over all components for one agent
    ///
    /// Evaluation order is the insertion order, every component every
    /// tick, so component state advances identically no matter how the
    /// caller consumes the totals.
    pub fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        self.entries
            .iter_mut()
            .map(|(func, weight)| func.compute(player, step) * *weight)
            .sum()
    }

    /// Weighted sum, additionally recording each component's weighted
    /// contribution under `Rewards/<name>` for the caller's logging
    pub fn compute_with_report(&mut self, player: &Player, step: &Step<'_>, report: &mut Report) -> f32 {
        let mut total = 0.0;
        for (func, weight) in &mut self.entries {
            let value = func.compute(player, step) * *weight;
            report.add_avg(format!("Rewards/{}", func.name()), value as f64);
            total += value;
        }
        total
    }
}

impl std::fmt::Debug for WeightedRewards {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedRewards")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(func, weight)| (func.name(), *weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
