//! Tick evaluation loop
//!
//! [`ShapingEngine`] owns a built reward set plus the episode metrics and
//! turns one `Step` per tick into one scalar per agent, in roster order.
//! Evaluation is fully deterministic: the same episode reset and the same
//! snapshot sequence produce bit-identical outputs, and `reset_episode`
//! restores the engine to a state indistinguishable from freshly built.

use crate::config::RewardConfig;
use crate::error::Result;
use crate::events::scoring_team;
use crate::metrics::{EpisodeMetrics, Report, TerminationReason};
use crate::rewards::WeightedRewards;
use crate::state::{GameState, Step};

/// Per-episode reward evaluation engine
///
/// One engine per environment instance; nothing is shared between
/// engines, so parallel environments just own parallel engines.
#[derive(Debug)]
pub struct ShapingEngine {
    rewards: WeightedRewards,
    metrics: EpisodeMetrics,
    report: Report,
}

impl ShapingEngine {
    pub fn new(rewards: WeightedRewards) -> Self {
        Self {
            rewards,
            metrics: EpisodeMetrics::new(),
            report: Report::new(),
        }
    }

    /// Build the engine straight from a validated config
    pub fn from_config(config: &RewardConfig) -> Result<Self> {
        Ok(Self::new(config.build()?))
    }

    /// Reset all component state and metrics for a new episode
    ///
    /// Must be called with the episode's initial snapshot before the first
    /// `evaluate_tick`; calling it again with the same snapshot yields an
    /// identical engine state.
    pub fn reset_episode(&mut self, initial: &GameState) {
        log::debug!(
            "episode reset: {} agents, {} reward components",
            initial.players.len(),
            self.rewards.len()
        );
        self.rewards.reset(initial);
        self.metrics.reset();
        self.report.clear();
    }

    /// Evaluate one tick for every agent, in roster order
    ///
    /// Returns `(car_id, total reward)` pairs. Episode metrics (ticks,
    /// touches, goals, cumulative rewards, termination) are updated as a
    /// side effect.
    pub fn evaluate_tick(&mut self, step: &Step<'_>) -> Vec<(u32, f32)> {
        self.observe_tick(step);

        let mut out = Vec::with_capacity(step.curr.players.len());
        for player in &step.curr.players {
            let total = self.rewards.compute(player, step);
            self.metrics.record_reward(player.car_id, total);
            out.push((player.car_id, total));
        }
        out
    }

    /// Like [`evaluate_tick`](Self::evaluate_tick), additionally recording
    /// the per-component breakdown into the engine's [`Report`]
    pub fn evaluate_tick_detailed(&mut self, step: &Step<'_>) -> Vec<(u32, f32)> {
        self.observe_tick(step);

        let mut out = Vec::with_capacity(step.curr.players.len());
        for player in &step.curr.players {
            let total = self.rewards.compute_with_report(player, step, &mut self.report);
            self.metrics.record_reward(player.car_id, total);
            out.push((player.car_id, total));
        }
        out
    }

    fn observe_tick(&mut self, step: &Step<'_>) {
        self.metrics.record_tick(step.curr.tick_count);
        for player in &step.curr.players {
            if player.ball_touched_step {
                self.metrics.record_touch();
            }
        }
        if let Some(team) = scoring_team(step.curr) {
            self.metrics.record_goal(team);
        }
        if step.is_final {
            let reason = if step.curr.goal_scored {
                TerminationReason::GoalScored
            } else {
                TerminationReason::TimeUp
            };
            self.metrics.set_termination(reason);
        }
    }

    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::test_fixtures::{next_tick, state_1v1, state_3v3};
    use rand::Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine() -> ShapingEngine {
        ShapingEngine::from_config(&RewardConfig::standard()).expect("standard config")
    }

    fn random_vec(rng: &mut ChaCha8Rng, scale: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
            rng.gen_range(0.0..scale),
        )
    }

    /// A seeded, physically loose but deterministic episode
    fn random_episode(seed: u64, ticks: usize) -> Vec<GameState> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut states = Vec::with_capacity(ticks);
        let mut state = state_1v1();
        for _ in 0..ticks {
            let mut next = next_tick(&state);
            next.ball.pos = random_vec(&mut rng, 4000.0);
            next.ball.vel = random_vec(&mut rng, 3000.0);
            for p in &mut next.players {
                p.pos = random_vec(&mut rng, 4000.0);
                p.vel = random_vec(&mut rng, 2000.0);
                p.on_ground = rng.gen_bool(0.6);
                p.ball_touched_step = rng.gen_bool(0.1);
                p.boost = rng.gen_range(0.0..100.0);
                p.controls.boost = if rng.gen_bool(0.3) { 1.0 } else { 0.0 };
            }
            states.push(next.clone());
            state = next;
        }
        states
    }

    fn run(engine: &mut ShapingEngine, episode: &[GameState]) -> Vec<Vec<(u32, f32)>> {
        engine.reset_episode(&episode[0]);
        let mut outputs = Vec::new();
        for i in 0..episode.len() {
            let prev = if i == 0 { None } else { Some(&episode[i - 1]) };
            let is_final = i == episode.len() - 1;
            let step = Step::new(&episode[i], prev, is_final);
            outputs.push(engine.evaluate_tick(&step));
        }
        outputs
    }

    #[test]
    fn test_outputs_in_roster_order() {
        let mut engine = engine();
        let state = state_1v1();
        engine.reset_episode(&state);

        let step = Step::new(&state, None, false);
        let out = engine.evaluate_tick(&step);
        let ids: Vec<u32> = out.iter().map(|(id, _)| *id).collect();
        let roster: Vec<u32> = state.players.iter().map(|p| p.car_id).collect();
        assert_eq!(ids, roster);
    }

    #[test]
    fn test_full_roster_one_output_per_agent() {
        let mut engine = engine();
        let state = state_3v3();
        engine.reset_episode(&state);

        let step = Step::new(&state, None, false);
        let out = engine.evaluate_tick(&step);
        let ids: Vec<u32> = out.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_identical_episodes_bit_identical_outputs() {
        let episode = random_episode(42, 120);
        let mut a = engine();
        let mut b = engine();
        assert_eq!(run(&mut a, &episode), run(&mut b, &episode));
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let episode = random_episode(7, 80);
        let mut engine = engine();

        let first = run(&mut engine, &episode);
        let second = run(&mut engine, &episode);
        assert_eq!(first, second);
    }

    #[test]
    fn test_metrics_accumulate() {
        let mut engine = engine();
        let mut state = state_1v1();
        engine.reset_episode(&state);

        state.players[0].ball_touched_step = true;
        let step = Step::new(&state, None, false);
        engine.evaluate_tick(&step);

        let mut goal = next_tick(&state);
        goal.goal_scored = true;
        goal.ball.pos = Vec3::new(0.0, 5200.0, 300.0);
        let step = Step::new(&goal, Some(&state), true);
        engine.evaluate_tick(&step);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.last_tick_count, goal.tick_count);
        assert_eq!(metrics.touches, 1);
        assert_eq!(metrics.goals, (1, 0));
        assert_eq!(metrics.termination_reason, TerminationReason::GoalScored);
        // Blue scored and was touching: positive cumulative reward
        assert!(metrics.cumulative_reward_for(1) > 0.0);

        engine.reset_episode(&state_1v1());
        assert_eq!(engine.metrics().total_ticks, 0);
    }

    #[test]
    fn test_detailed_run_records_breakdown() {
        let mut engine = engine();
        let state = state_1v1();
        engine.reset_episode(&state);

        let step = Step::new(&state, None, false);
        let detailed = engine.evaluate_tick_detailed(&step);
        assert_eq!(detailed.len(), 2);
        assert!(engine.report().avg("Rewards/save_boost").is_some());
    }

    #[test]
    fn test_detailed_matches_plain_totals() {
        let episode = random_episode(99, 60);
        let mut plain = engine();
        let mut detailed = engine();

        let plain_out = run(&mut plain, &episode);

        detailed.reset_episode(&episode[0]);
        let mut detailed_out = Vec::new();
        for i in 0..episode.len() {
            let prev = if i == 0 { None } else { Some(&episode[i - 1]) };
            let step = Step::new(&episode[i], prev, i == episode.len() - 1);
            detailed_out.push(detailed.evaluate_tick_detailed(&step));
        }
        assert_eq!(plain_out, detailed_out);
    }
}
