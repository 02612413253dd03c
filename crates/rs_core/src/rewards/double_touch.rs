//! Double-touch family
//!
//! One timing machine, three scoring surfaces: the completed double touch
//! itself (wall multipliers), the setup touch that makes one possible, and
//! a continuous post-touch trajectory signal with time decay.

use serde::{Deserialize, Serialize};

use crate::events::{classify_wall_bounce, BounceParams, WallBounce};
use crate::math::unit_range;
use crate::physics_constants::arena;
use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, DoubleTouchTracker, TouchWindow};

use super::{ball_goal_alignment, RewardFunction};

// ============================================================================
// DoubleTouchReward
// ============================================================================

/// Scoring knobs for a completed double
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoubleTouchParams {
    pub window: TouchWindow,
    pub bounce: BounceParams,
    /// The ball must still be this high at the second touch
    pub min_ball_height: f32,
    /// Multiplier when the ball came off the opponent back wall between touches
    pub opponent_backwall_mult: f32,
    /// Multiplier for a side-wall redirect
    pub side_wall_mult: f32,
    /// Multiplier when the redirect came off the agent's own back wall
    pub own_backwall_mult: f32,
}

impl Default for DoubleTouchParams {
    fn default() -> Self {
        Self {
            window: TouchWindow::default(),
            bounce: BounceParams::default(),
            min_ball_height: 110.0,
            opponent_backwall_mult: 2.0,
            side_wall_mult: 1.5,
            own_backwall_mult: 0.5,
        }
    }
}

/// Payout on the second touch of a legal double
///
/// The wall flag recorded by the tracker picks the multiplier; a plain
/// aerial double pays the base of 1. Ceiling contact between the touches
/// already killed the sequence inside the tracker.
#[derive(Debug, Clone, Default)]
pub struct DoubleTouchReward {
    pub params: DoubleTouchParams,
    agents: AgentMap<DoubleTouchTracker>,
}

impl DoubleTouchReward {
    pub fn new(params: DoubleTouchParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for DoubleTouchReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let tracker = match self.agents.get_mut(player.car_id, "double_touch") {
            Some(t) => t,
            None => return 0.0,
        };

        let bounce = classify_wall_bounce(step, player.team, &self.params.bounce);
        let done = tracker.observe(
            player.ball_touched_step,
            bounce,
            step.curr.delta_time,
            &self.params.window,
        );

        let done = match done {
            Some(d) => d,
            None => return 0.0,
        };
        if step.curr.ball.pos.z < self.params.min_ball_height {
            return 0.0;
        }

        match done.wall {
            Some(WallBounce::OpponentBackWall) => self.params.opponent_backwall_mult,
            Some(WallBounce::SideWall) => self.params.side_wall_mult,
            Some(WallBounce::OwnBackWall) => self.params.own_backwall_mult,
            Some(WallBounce::Ceiling) | None => 1.0,
        }
    }

    fn name(&self) -> &str {
        "double_touch"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents.reset(&initial.players);
    }
}

// ============================================================================
// SetupTouchReward
// ============================================================================

/// Weights for the setup-touch bonuses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetupTouchParams {
    /// Ball upward velocity mapped over this range
    pub min_up_vel: f32,
    pub max_up_vel: f32,
    /// Ball height mapped from here to 75% of the ceiling
    pub min_height: f32,
}

impl Default for SetupTouchParams {
    fn default() -> Self {
        Self { min_up_vel: 100.0, max_up_vel: 1200.0, min_height: 200.0 }
    }
}

/// Reward the first touch that makes a double possible: popping the ball
/// up, keeping it goalward, ideally from the air
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupTouchReward {
    pub params: SetupTouchParams,
}

impl RewardFunction for SetupTouchReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        if !player.ball_touched_step {
            return 0.0;
        }
        let ball = &step.curr.ball;

        let up = unit_range(ball.vel.z, self.params.min_up_vel, self.params.max_up_vel);
        let height = unit_range(ball.pos.z, self.params.min_height, arena::CEILING_Z * 0.75);
        let goalward = ball_goal_alignment(ball, player.team, 0.75).max(0.0);
        let aerial = if player.on_ground { 0.0 } else { 1.0 };

        0.4 * up + 0.3 * height + 0.2 * goalward + 0.1 * aerial
    }

    fn name(&self) -> &str {
        "setup_touch"
    }
}

// ============================================================================
// CarryTrajectoryReward
// ============================================================================

/// Shape of the post-touch trajectory signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarryTrajectoryParams {
    /// Signal window after each touch (seconds)
    pub window: f32,
    /// Exponential decay time constant within the window
    pub decay_tau: f32,
}

impl Default for CarryTrajectoryParams {
    fn default() -> Self {
        Self { window: 2.0, decay_tau: 0.75 }
    }
}

/// Continuous goalward-trajectory credit for a short window after each of
/// the agent's touches, decaying with time since the touch
#[derive(Debug, Clone, Default)]
pub struct CarryTrajectoryReward {
    pub params: CarryTrajectoryParams,
    /// Seconds since each agent's last touch
    touch_age: AgentMap<f32>,
}

impl CarryTrajectoryReward {
    pub fn new(params: CarryTrajectoryParams) -> Self {
        Self { params, touch_age: AgentMap::new() }
    }
}

impl RewardFunction for CarryTrajectoryReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let age = match self.touch_age.get_mut(player.car_id, "carry_trajectory") {
            Some(a) => a,
            None => return 0.0,
        };

        if player.ball_touched_step {
            *age = 0.0;
        } else {
            *age += step.curr.delta_time;
        }
        let age = *age;
        if age > self.params.window {
            return 0.0;
        }

        let goalward = ball_goal_alignment(&step.curr.ball, player.team, 0.75).max(0.0);
        goalward * (-age / self.params.decay_tau).exp()
    }

    fn name(&self) -> &str {
        "carry_trajectory"
    }

    fn reset(&mut self, initial: &GameState) {
        self.touch_age.reset_with(&initial.players, |_| f32::INFINITY);
    }
}
