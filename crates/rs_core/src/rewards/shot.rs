//! Shot-on-goal components
//!
//! Continuous quality on touches, and the one-shot payout when the
//! trajectory classifier proves the shot unsaveable. Attribution goes to
//! the agent whose touch produced the trajectory; a per-agent rising-edge
//! gate plus cooldown keeps a single shot from scoring every tick it
//! remains guaranteed.

use serde::{Deserialize, Serialize};

use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, Cooldown};
use crate::trajectory::{is_guaranteed_shot, shot_quality, ShotParams};

use super::RewardFunction;

// ============================================================================
// ShotQualityReward
// ============================================================================

/// On a touch tick, the continuous [0, 1] quality of the resulting ball
/// trajectory toward the attacked goal
#[derive(Debug, Clone, Copy, Default)]
pub struct ShotQualityReward {
    pub params: ShotParams,
}

impl RewardFunction for ShotQualityReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        if !player.ball_touched_step {
            return 0.0;
        }
        shot_quality(step.curr, player.team, &self.params)
    }

    fn name(&self) -> &str {
        "shot_quality"
    }
}

// ============================================================================
// GuaranteedShotReward
// ============================================================================

/// Gating for the guaranteed-shot payout
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuaranteedShotParams {
    /// Classifier thresholds
    pub shot: ShotParams,
    /// The payout goes to an agent that touched within this window (seconds)
    pub attribution_window: f32,
    /// Per-agent refractory period between payouts (seconds)
    pub cooldown: f32,
}

impl Default for GuaranteedShotParams {
    fn default() -> Self {
        Self {
            shot: ShotParams::default(),
            attribution_window: 0.5,
            cooldown: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ShotState {
    cooldown: Cooldown,
    /// Seconds since this agent last touched the ball
    touch_age: f32,
    /// Classifier output last tick, for edge detection
    was_guaranteed: bool,
}

/// Unit payout on the tick a shot becomes provably unsaveable
///
/// Fires on the rising edge of the classifier, only for the agent whose
/// touch is recent enough to own the trajectory.
#[derive(Debug, Clone, Default)]
pub struct GuaranteedShotReward {
    pub params: GuaranteedShotParams,
    agents: AgentMap<ShotState>,
}

impl GuaranteedShotReward {
    pub fn new(params: GuaranteedShotParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for GuaranteedShotReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let state = match self.agents.get_mut(player.car_id, "guaranteed_shot") {
            Some(s) => s,
            None => return 0.0,
        };

        let dt = step.curr.delta_time;
        state.cooldown.tick(dt);
        if player.ball_touched_step {
            state.touch_age = 0.0;
        } else {
            state.touch_age += dt;
        }

        let guaranteed = is_guaranteed_shot(step.curr, player.team, &self.params.shot);
        let rising = guaranteed && !state.was_guaranteed;
        state.was_guaranteed = guaranteed;

        if !rising {
            return 0.0;
        }
        if state.touch_age > self.params.attribution_window {
            return 0.0;
        }
        if !state.cooldown.ready() {
            return 0.0;
        }
        state.cooldown.fire();
        1.0
    }

    fn name(&self) -> &str {
        "guaranteed_shot"
    }

    fn reset(&mut self, initial: &GameState) {
        let cooldown = self.params.cooldown;
        self.agents.reset_with(&initial.players, |_| ShotState {
            cooldown: Cooldown::new(cooldown),
            touch_age: f32::INFINITY,
            was_guaranteed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::physics_constants::goal;
    use crate::test_fixtures::{next_tick, state_1v1};

    /// Blue has just rifled the ball at an open orange net
    fn open_net_touch() -> GameState {
        let mut state = state_1v1();
        state.ball.pos = Vec3::new(0.0, goal::PLANE_Y - 2000.0, 200.0);
        state.ball.vel = Vec3::new(0.0, 2800.0, 250.0);
        state.players[0].pos = Vec3::new(0.0, -3000.0, 17.0);
        state.players[0].ball_touched_step = true;
        state.players[1].pos = Vec3::new(0.0, -4000.0, 17.0);
        state
    }

    #[test]
    fn test_quality_only_on_touch() {
        let state = open_net_touch();
        let step = Step::new(&state, None, false);
        let mut reward = ShotQualityReward::default();

        let shooter = reward.compute(&state.players[0], &step);
        assert!(shooter > 0.0);
        // The orange car did not touch
        assert_eq!(reward.compute(&state.players[1], &step), 0.0);
    }

    #[test]
    fn test_guaranteed_shot_fires_once() {
        let initial = state_1v1();
        let mut reward = GuaranteedShotReward::default();
        reward.reset(&initial);

        let curr = open_net_touch();
        let step = Step::new(&curr, None, false);
        assert_eq!(reward.compute(&curr.players[0], &step), 1.0);

        // Still guaranteed next tick: no rising edge, no second payout
        let mut later = next_tick(&curr);
        later.ball.pos += later.ball.vel * later.delta_time;
        let step = Step::new(&later, Some(&curr), false);
        assert_eq!(reward.compute(&later.players[0], &step), 0.0);
    }

    #[test]
    fn test_guaranteed_shot_needs_recent_touch() {
        let initial = state_1v1();
        let mut reward = GuaranteedShotReward::default();
        reward.reset(&initial);

        let mut curr = open_net_touch();
        curr.players[0].ball_touched_step = false;
        let step = Step::new(&curr, None, false);
        // Never touched this episode: no attribution
        assert_eq!(reward.compute(&curr.players[0], &step), 0.0);
    }

    #[test]
    fn test_defending_team_never_paid() {
        let initial = state_1v1();
        let mut reward = GuaranteedShotReward::default();
        reward.reset(&initial);

        let mut curr = open_net_touch();
        curr.players[1].ball_touched_step = true;
        let step = Step::new(&curr, None, false);
        // The shot is goalward for blue; orange gets nothing from it
        assert_eq!(reward.compute(&curr.players[1], &step), 0.0);
    }

    #[test]
    fn test_reset_rearms_the_payout() {
        let initial = state_1v1();
        let mut reward = GuaranteedShotReward::default();
        reward.reset(&initial);

        let curr = open_net_touch();
        let step = Step::new(&curr, None, false);
        assert_eq!(reward.compute(&curr.players[0], &step), 1.0);

        reward.reset(&initial);
        let step = Step::new(&curr, None, false);
        assert_eq!(reward.compute(&curr.players[0], &step), 1.0);
    }
}
