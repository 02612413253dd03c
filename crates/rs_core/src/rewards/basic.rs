//! Basic shaping components
//!
//! Stateless (or nearly stateless) per-tick signals: airborne time,
//! facing, closing speed, touch strength, boost conservation, and goal
//! attribution. These form the dense backbone of a reward set; the
//! sequence-tracking families build on top of them.

use serde::{Deserialize, Serialize};

use crate::events::scoring_team;
use crate::math::{alignment, unit_range};
use crate::physics_constants::{ball, car};
use crate::state::{Player, Step};

use super::RewardFunction;

// ============================================================================
// AirReward
// ============================================================================

/// Constant signal while the car is airborne
#[derive(Debug, Clone, Copy, Default)]
pub struct AirReward;

impl RewardFunction for AirReward {
    fn compute(&mut self, player: &Player, _step: &Step<'_>) -> f32 {
        if player.on_ground {
            0.0
        } else {
            1.0
        }
    }

    fn name(&self) -> &str {
        "air"
    }
}

// ============================================================================
// FaceBallReward
// ============================================================================

/// Cosine between the car's nose and the direction to the ball
///
/// Negative while facing away; the epsilon guard returns 0 when the car
/// sits exactly on the ball.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceBallReward;

impl RewardFunction for FaceBallReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        alignment(player.forward, step.curr.ball.pos - player.pos)
    }

    fn name(&self) -> &str {
        "face_ball"
    }
}

// ============================================================================
// VelocityPlayerToBallReward
// ============================================================================

/// Closing speed toward the ball as a fraction of car max speed
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityPlayerToBallReward;

impl RewardFunction for VelocityPlayerToBallReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let dir = crate::math::normalize_or_zero(step.curr.ball.pos - player.pos);
        (player.vel.dot(&dir) / car::MAX_SPEED).clamp(-1.0, 1.0)
    }

    fn name(&self) -> &str {
        "velocity_to_ball"
    }
}

// ============================================================================
// StrongTouchReward
// ============================================================================

/// Touch strength mapped over a useful ball-speed-change range
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrongTouchParams {
    /// Ball |Δv| where the reward starts
    pub min_delta_v: f32,
    /// Ball |Δv| where the reward saturates
    pub max_delta_v: f32,
}

impl Default for StrongTouchParams {
    fn default() -> Self {
        Self { min_delta_v: 500.0, max_delta_v: 4600.0 }
    }
}

/// On a touch tick, reward the magnitude of the ball velocity change,
/// linearly over `[min_delta_v, max_delta_v]`
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongTouchReward {
    pub params: StrongTouchParams,
}

impl RewardFunction for StrongTouchReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let prev_ball = match step.prev_ball() {
            Some(b) => b,
            None => return 0.0,
        };
        if !player.ball_touched_step {
            return 0.0;
        }
        let delta_v = (step.curr.ball.vel - prev_ball.vel).norm();
        unit_range(delta_v, self.params.min_delta_v, self.params.max_delta_v)
    }

    fn name(&self) -> &str {
        "strong_touch"
    }
}

// ============================================================================
// TouchAccelReward
// ============================================================================

/// On a touch tick, ball |Δv| as a fraction of the ball speed cap
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchAccelReward;

impl RewardFunction for TouchAccelReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let prev_ball = match step.prev_ball() {
            Some(b) => b,
            None => return 0.0,
        };
        if !player.ball_touched_step {
            return 0.0;
        }
        ((step.curr.ball.vel - prev_ball.vel).norm() / ball::MAX_SPEED).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "touch_accel"
    }
}

// ============================================================================
// SaveBoostReward
// ============================================================================

/// sqrt of the boost fraction: conserving boost is worth more at low
/// amounts than topping off at high amounts
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveBoostReward;

impl RewardFunction for SaveBoostReward {
    fn compute(&mut self, player: &Player, _step: &Step<'_>) -> f32 {
        (player.boost / car::MAX_BOOST).clamp(0.0, 1.0).sqrt()
    }

    fn name(&self) -> &str {
        "save_boost"
    }
}

// ============================================================================
// Goal attribution
// ============================================================================

/// +1 on the terminal tick when the player's team scored
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalReward;

impl RewardFunction for GoalReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        if !step.is_final {
            return 0.0;
        }
        if scoring_team(step.curr) == Some(player.team) {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "goal"
    }
}

/// -1 on the terminal tick when the goal went into the player's own net
///
/// Scaled by the aggregation weight; kept separate from [`GoalReward`]
/// so conceding can be punished harder than scoring is rewarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnGoalPunishment;

impl RewardFunction for OwnGoalPunishment {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        if !step.is_final {
            return 0.0;
        }
        if super::conceded(player.team, step.curr) {
            -1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "own_goal_punishment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::test_fixtures::{next_tick, state_1v1};

    #[test]
    fn test_air_reward() {
        let mut state = state_1v1();
        let step = Step::new(&state, None, false);
        assert_eq!(AirReward.compute(&state.players[0], &step), 0.0);

        state.players[0].on_ground = false;
        let step = Step::new(&state, None, false);
        assert_eq!(AirReward.compute(&state.players[0], &step), 1.0);
    }

    #[test]
    fn test_face_ball_sign() {
        let state = state_1v1();
        let step = Step::new(&state, None, false);

        // Blue spawns facing +y with the ball at center: facing it
        let facing = FaceBallReward.compute(&state.players[0], &step);
        assert!(facing > 0.9);

        let mut away = state.clone();
        away.players[0].forward = Vec3::new(0.0, -1.0, 0.0);
        let step = Step::new(&away, None, false);
        assert!(FaceBallReward.compute(&away.players[0], &step) < -0.9);
    }

    #[test]
    fn test_velocity_to_ball_at_rest_is_zero() {
        let state = state_1v1();
        let step = Step::new(&state, None, false);
        assert_eq!(VelocityPlayerToBallReward.compute(&state.players[0], &step), 0.0);
    }

    #[test]
    fn test_strong_touch_requires_history_and_touch() {
        let prev = state_1v1();
        let mut curr = next_tick(&prev);
        curr.ball.vel = Vec3::new(0.0, 2500.0, 0.0);
        curr.players[0].ball_touched_step = true;

        let mut reward = StrongTouchReward::default();

        // First tick of the episode: exactly zero
        let step = Step::new(&curr, None, false);
        assert_eq!(reward.compute(&curr.players[0], &step), 0.0);

        let step = Step::new(&curr, Some(&prev), false);
        let r = reward.compute(&curr.players[0], &step);
        assert!(r > 0.0 && r <= 1.0);

        // No touch flag: no reward even with a large delta
        assert_eq!(reward.compute(&curr.players[1], &step), 0.0);
    }

    #[test]
    fn test_touch_accel_scales_with_delta() {
        let prev = state_1v1();
        let mut weak = next_tick(&prev);
        weak.ball.vel = Vec3::new(0.0, 600.0, 0.0);
        weak.players[0].ball_touched_step = true;

        let mut strong = next_tick(&prev);
        strong.ball.vel = Vec3::new(0.0, 4000.0, 0.0);
        strong.players[0].ball_touched_step = true;

        let mut reward = TouchAccelReward;
        let weak_r = reward.compute(&weak.players[0], &Step::new(&weak, Some(&prev), false));
        let strong_r = reward.compute(&strong.players[0], &Step::new(&strong, Some(&prev), false));
        assert!(strong_r > weak_r);
        assert!(weak_r > 0.0);
    }

    #[test]
    fn test_save_boost_curve() {
        let mut state = state_1v1();
        state.players[0].boost = 100.0;
        let step = Step::new(&state, None, false);
        assert!((SaveBoostReward.compute(&state.players[0], &step) - 1.0).abs() < 1e-6);

        state.players[0].boost = 25.0;
        let step = Step::new(&state, None, false);
        assert!((SaveBoostReward.compute(&state.players[0], &step) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_goal_and_own_goal_attribution() {
        let mut state = state_1v1();
        state.goal_scored = true;
        state.ball.pos = Vec3::new(0.0, 5200.0, 300.0); // orange conceded

        let step = Step::new(&state, None, true);
        assert_eq!(GoalReward.compute(&state.players[0], &step), 1.0);
        assert_eq!(GoalReward.compute(&state.players[1], &step), 0.0);
        assert_eq!(OwnGoalPunishment.compute(&state.players[0], &step), 0.0);
        assert_eq!(OwnGoalPunishment.compute(&state.players[1], &step), -1.0);

        // Non-terminal tick: both silent
        let step = Step::new(&state, None, false);
        assert_eq!(GoalReward.compute(&state.players[0], &step), 0.0);
        assert_eq!(OwnGoalPunishment.compute(&state.players[1], &step), 0.0);
    }
}
