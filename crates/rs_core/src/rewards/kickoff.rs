//! Kickoff family
//!
//! Speed off the line and first-touch attribution. Both run off the
//! kickoff phase machine; the first-touch component additionally keeps a
//! longer tail armed so a concede right after a lost kickoff is pinned on
//! whoever took the first touch.

use serde::{Deserialize, Serialize};

use crate::events::{kickoff_pending, KickoffParams};
use crate::math::normalize_or_zero;
use crate::physics_constants::car;
use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, KickoffPhaseParams, KickoffTracker};

use super::{conceded, RewardFunction};

// ============================================================================
// KickoffSpeedReward
// ============================================================================

/// Thresholds for the kickoff speed signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KickoffSpeedParams {
    pub pending: KickoffParams,
    pub phase: KickoffPhaseParams,
    /// Added while flipping at speed (the speedflip window)
    pub flip_bonus: f32,
    /// Flip bonus requires at least this much speed
    pub flip_min_speed: f32,
    /// Below this speed the slow ramp applies
    pub slow_speed: f32,
    /// The slow ramp starts this long into the kickoff
    pub ramp_start: f32,
    /// Penalty at the end of the ramp
    pub slow_penalty: f32,
}

impl Default for KickoffSpeedParams {
    fn default() -> Self {
        Self {
            pending: KickoffParams::default(),
            phase: KickoffPhaseParams::default(),
            flip_bonus: 0.5,
            flip_min_speed: 1000.0,
            slow_speed: 800.0,
            ramp_start: 0.75,
            slow_penalty: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SpeedAgent {
    tracker: KickoffTracker,
    /// Seconds spent in the current kickoff phase
    phase_time: f32,
}

/// Per-tick signal while a kickoff is live: closing speed on the ball,
/// plus a flip bonus at speed, minus a ramp that punishes creeping off
/// the line without committing
#[derive(Debug, Clone, Default)]
pub struct KickoffSpeedReward {
    pub params: KickoffSpeedParams,
    agents: AgentMap<SpeedAgent>,
}

impl KickoffSpeedReward {
    pub fn new(params: KickoffSpeedParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for KickoffSpeedReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let pending = kickoff_pending(step.curr, &params.pending);
        let ball_speed = step.curr.ball.vel.norm();
        let dt = step.curr.delta_time;

        let agent = match self.agents.get_mut(player.car_id, "kickoff_speed") {
            Some(a) => a,
            None => return 0.0,
        };
        agent.tracker.update(pending, ball_speed, dt, &params.phase);
        if !agent.tracker.in_kickoff() {
            agent.phase_time = 0.0;
            return 0.0;
        }
        agent.phase_time += dt;

        let to_ball = normalize_or_zero(step.curr.ball.pos - player.pos);
        let closing = (player.vel.dot(&to_ball) / car::MAX_SPEED).clamp(0.0, 1.0);
        let speed = player.vel.norm();

        let mut total = closing;
        if player.is_flipping && speed >= params.flip_min_speed {
            total += params.flip_bonus;
        }
        if agent.phase_time > params.ramp_start && speed < params.slow_speed && !player.is_flipping
        {
            let ramp = (agent.phase_time - params.ramp_start)
                / (params.phase.max_kickoff_time - params.ramp_start).max(f32::EPSILON);
            total -= params.slow_penalty * ramp.clamp(0.0, 1.0);
        }
        total
    }

    fn name(&self) -> &str {
        "kickoff_speed"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents.reset(&initial.players);
    }
}

// ============================================================================
// KickoffFirstTouchReward
// ============================================================================

/// Payout shape for kickoff first-touch attribution
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KickoffTouchParams {
    pub pending: KickoffParams,
    pub phase: KickoffPhaseParams,
    /// One-shot bonus for winning the first touch
    pub first_touch_bonus: f32,
    /// Punishment when the team concedes inside the window after that touch
    pub concede_penalty: f32,
}

impl Default for KickoffTouchParams {
    fn default() -> Self {
        Self {
            pending: KickoffParams::default(),
            phase: KickoffPhaseParams::default(),
            first_touch_bonus: 1.0,
            concede_penalty: 1.0,
        }
    }
}

/// First-touch bonus plus an early-concede tail
///
/// Winning the touch pays once per kickoff. If the agent's team concedes
/// within the concede window after that touch, the same agent eats the
/// punishment; the tail disarms after paying out.
#[derive(Debug, Clone, Default)]
pub struct KickoffFirstTouchReward {
    pub params: KickoffTouchParams,
    agents: AgentMap<KickoffTracker>,
}

impl KickoffFirstTouchReward {
    pub fn new(params: KickoffTouchParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for KickoffFirstTouchReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let pending = kickoff_pending(step.curr, &params.pending);
        let ball_speed = step.curr.ball.vel.norm();

        let tracker = match self.agents.get_mut(player.car_id, "kickoff_first_touch") {
            Some(t) => t,
            None => return 0.0,
        };
        tracker.update(pending, ball_speed, step.curr.delta_time, &params.phase);

        let mut total = 0.0;
        if player.ball_touched_step && tracker.note_touch() {
            total += params.first_touch_bonus;
        }
        if step.curr.goal_scored
            && conceded(player.team, step.curr)
            && tracker.concede_armed(&params.phase)
        {
            tracker.disarm();
            total -= params.concede_penalty;
        }
        total
    }

    fn name(&self) -> &str {
        "kickoff_first_touch"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents.reset(&initial.players);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::test_fixtures::state_1v1;

    #[test]
    fn test_kickoff_speed_rewards_closing_fast() {
        let initial = state_1v1();
        let mut reward = KickoffSpeedReward::default();
        reward.reset(&initial);

        let mut state = state_1v1();
        state.players[0].vel = Vec3::new(0.0, 2200.0, 0.0);

        let step = Step::new(&state, None, false);
        let fast = reward.compute(&state.players[0], &step);
        assert!(fast > 0.9);

        // The stationary opponent earns nothing yet (ramp not started)
        let step = Step::new(&state, None, false);
        assert_eq!(reward.compute(&state.players[1], &step), 0.0);
    }

    #[test]
    fn test_kickoff_speed_flip_bonus() {
        let initial = state_1v1();
        let mut reward = KickoffSpeedReward::default();
        reward.reset(&initial);

        let mut state = state_1v1();
        state.players[0].vel = Vec3::new(0.0, 1500.0, 0.0);

        let step = Step::new(&state, None, false);
        let plain = reward.compute(&state.players[0], &step);

        state.players[0].is_flipping = true;
        let step = Step::new(&state, None, false);
        let flipping = reward.compute(&state.players[0], &step);
        assert!((flipping - plain - reward.params.flip_bonus).abs() < 1e-3);
    }

    #[test]
    fn test_kickoff_speed_slow_ramp_punishes() {
        let initial = state_1v1();
        let mut reward = KickoffSpeedReward::default();
        reward.reset(&initial);

        let state = state_1v1();
        // Sit still on the spawn through the whole ramp
        let mut last = 0.0;
        for _ in 0..30 {
            let step = Step::new(&state, None, false);
            last = reward.compute(&state.players[0], &step);
        }
        assert!(last < 0.0, "idle kickoff scored {last}");
    }

    #[test]
    fn test_kickoff_speed_silent_after_phase() {
        let initial = state_1v1();
        let mut reward = KickoffSpeedReward::default();
        reward.reset(&initial);

        let state = state_1v1();
        let step = Step::new(&state, None, false);
        reward.compute(&state.players[0], &step);

        // Ball launched: the phase is over
        let mut live = state_1v1();
        live.ball.pos = Vec3::new(0.0, 2000.0, 300.0);
        live.ball.vel = Vec3::new(0.0, 2000.0, 100.0);
        live.players[0].vel = Vec3::new(0.0, 2000.0, 0.0);
        let step = Step::new(&live, None, false);
        assert_eq!(reward.compute(&live.players[0], &step), 0.0);
    }

    #[test]
    fn test_first_touch_pays_once() {
        let initial = state_1v1();
        let mut reward = KickoffFirstTouchReward::default();
        reward.reset(&initial);

        let mut state = state_1v1();
        state.players[0].ball_touched_step = true;

        let step = Step::new(&state, None, false);
        assert_eq!(
            reward.compute(&state.players[0], &step),
            reward.params.first_touch_bonus
        );
        let step = Step::new(&state, None, false);
        assert_eq!(reward.compute(&state.players[0], &step), 0.0);
    }

    #[test]
    fn test_concede_after_first_touch_is_punished() {
        let initial = state_1v1();
        let mut reward = KickoffFirstTouchReward::default();
        reward.reset(&initial);

        // Blue wins the touch
        let mut state = state_1v1();
        state.players[0].ball_touched_step = true;
        let step = Step::new(&state, None, false);
        assert!(reward.compute(&state.players[0], &step) > 0.0);

        // A couple seconds later the ball is in blue's own net
        let mut goal = state_1v1();
        goal.ball.pos = Vec3::new(0.0, -5200.0, 300.0);
        goal.ball.vel = Vec3::new(0.0, -1000.0, 0.0);
        goal.goal_scored = true;
        for _ in 0..30 {
            // Advance the tail clock without touches
            let mut quiet = goal.clone();
            quiet.goal_scored = false;
            let step = Step::new(&quiet, None, false);
            assert_eq!(reward.compute(&state.players[0], &step), 0.0);
        }
        let step = Step::new(&goal, None, true);
        assert_eq!(
            reward.compute(&state.players[0], &step),
            -reward.params.concede_penalty
        );

        // The punishment fires once
        let step = Step::new(&goal, None, true);
        assert_eq!(reward.compute(&state.players[0], &step), 0.0);
    }
}
