//! Aerial-carry family
//!
//! Sustained air-dribble control and its surrounding moments: the grounded
//! setup that pops the ball up, the first aerial touch that starts the
//! carry, the carry itself, and finishing a goal off one. All four share
//! one canonical condition set evaluated by [`carry_conditions`]; each
//! component owns its own per-agent tracker state.

use serde::{Deserialize, Serialize};

use crate::events::just_left_ground;
use crate::math::unit_range;
use crate::physics_constants::{arena, car};
use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, CarryParams, CarryTracker, Cooldown};

use super::{ball_goal_alignment, RewardFunction};

// ============================================================================
// Shared condition set
// ============================================================================

/// Geometry thresholds for "this agent is carrying the ball"
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarryGeometry {
    /// Max car-to-ball distance that still counts as control
    pub max_ball_dist: f32,
    /// Ball vertical velocity above this counts as rising (small negative
    /// tolerance so the top of the arc does not flicker)
    pub min_rise_vel: f32,
}

impl Default for CarryGeometry {
    fn default() -> Self {
        Self { max_ball_dist: 300.0, min_rise_vel: -150.0 }
    }
}

/// The canonical carry condition set: airborne, under the ball, close to
/// it, ball not falling away, trajectory goalward enough
///
/// Boost feathering is tracked separately by the caller's [`CarryTracker`]
/// since it needs per-agent history.
pub fn carry_conditions(
    player: &Player,
    state: &GameState,
    geometry: &CarryGeometry,
    carry: &CarryParams,
) -> bool {
    if player.on_ground {
        return false;
    }
    if player.pos.z >= state.ball.pos.z {
        return false;
    }
    if (state.ball.pos - player.pos).norm() > geometry.max_ball_dist {
        return false;
    }
    if state.ball.vel.z < geometry.min_rise_vel {
        return false;
    }
    ball_goal_alignment(&state.ball, player.team, 0.75) >= carry.min_alignment
}

// ============================================================================
// AerialCarryReward
// ============================================================================

/// Scoring knobs for the per-tick carry signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AerialCarryParams {
    pub carry: CarryParams,
    pub geometry: CarryGeometry,
    /// Ball height with the best arc score, as a fraction of the ceiling
    pub optimal_height_frac: f32,
    /// Duration multiplier grows at this rate per second of control
    pub duration_rate: f32,
    /// Cap on the duration multiplier
    pub duration_cap: f32,
    /// Extra multiplier per touch during the carry
    pub touch_bonus: f32,
    /// Cap on the touch multiplier
    pub touch_cap: f32,
}

impl Default for AerialCarryParams {
    fn default() -> Self {
        Self {
            carry: CarryParams::default(),
            geometry: CarryGeometry::default(),
            optimal_height_frac: 0.75,
            duration_rate: 0.5,
            duration_cap: 2.0,
            touch_bonus: 0.1,
            touch_cap: 1.5,
        }
    }
}

/// Per-tick payout while an aerial carry is live
///
/// Base signal is the arc score (1 at the optimal height, falling off
/// linearly toward the floor and the ceiling), multiplied by capped
/// duration and touch-count factors so longer, actively-controlled
/// carries pay more per tick.
#[derive(Debug, Clone, Default)]
pub struct AerialCarryReward {
    pub params: AerialCarryParams,
    agents: AgentMap<CarryTracker>,
}

impl AerialCarryReward {
    pub fn new(params: AerialCarryParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }

    fn arc_score(&self, ball_z: f32) -> f32 {
        let optimal = arena::CEILING_Z * self.params.optimal_height_frac;
        (1.0 - (ball_z - optimal).abs() / optimal).clamp(0.0, 1.0)
    }
}

impl RewardFunction for AerialCarryReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let arc = self.arc_score(step.curr.ball.pos.z);
        let tracker = match self.agents.get_mut(player.car_id, "aerial_carry") {
            Some(t) => t,
            None => return 0.0,
        };

        let dt = step.curr.delta_time;
        tracker.note_boost(player.controls.boost > 0.0, dt);

        let conditions = carry_conditions(player, step.curr, &params.geometry, &params.carry)
            && tracker.boosting_within_grace(&params.carry);
        let active = tracker.update(
            conditions,
            player.ball_touched_step,
            step.curr.ball.pos.z,
            player.pos,
            dt,
            &params.carry,
        );
        if !active {
            return 0.0;
        }

        let duration_mult =
            (1.0 + tracker.control_time() * params.duration_rate).min(params.duration_cap);
        let touch_mult =
            (1.0 + tracker.touch_count() as f32 * params.touch_bonus).min(params.touch_cap);
        arc * duration_mult * touch_mult
    }

    fn name(&self) -> &str {
        "aerial_carry"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents.reset(&initial.players);
    }
}

// ============================================================================
// CarrySetupReward
// ============================================================================

/// Thresholds for the grounded dribble-and-pop pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarrySetupParams {
    /// Max horizontal car-to-ball distance while dribbling
    pub max_dribble_dist: f32,
    /// Roof-band height range for a controlled ground dribble
    pub min_ball_height: f32,
    pub max_ball_height: f32,
    /// Ball upward velocity that counts the liftoff as a pop
    pub min_pop_vel: f32,
    /// Per-tick dribble signal amplitude
    pub dribble_scale: f32,
    /// One-shot bonus at liftoff
    pub pop_bonus: f32,
    /// Per-agent refractory period for the pop bonus
    pub cooldown: f32,
}

impl Default for CarrySetupParams {
    fn default() -> Self {
        Self {
            max_dribble_dist: 200.0,
            min_ball_height: 110.0,
            max_ball_height: 250.0,
            min_pop_vel: 300.0,
            dribble_scale: 0.1,
            pop_bonus: 1.0,
            cooldown: 3.0,
        }
    }
}

/// Grounded setup for a carry: small per-tick credit while the ball rides
/// the roof, and a one-shot bonus when the car leaves the ground with the
/// ball popped upward
#[derive(Debug, Clone, Default)]
pub struct CarrySetupReward {
    pub params: CarrySetupParams,
    cooldowns: AgentMap<Cooldown>,
}

impl CarrySetupReward {
    pub fn new(params: CarrySetupParams) -> Self {
        Self { params, cooldowns: AgentMap::new() }
    }

    fn dribbling(&self, player: &Player, state: &GameState) -> bool {
        if !player.on_ground {
            return false;
        }
        let ball_pos = state.ball.pos;
        let horiz = (ball_pos.xy() - player.pos.xy()).norm();
        horiz <= self.params.max_dribble_dist
            && ball_pos.z >= self.params.min_ball_height
            && ball_pos.z <= self.params.max_ball_height
    }
}

impl RewardFunction for CarrySetupReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let dribbling = self.dribbling(player, step.curr);
        let params = self.params;

        let cooldown = match self.cooldowns.get_mut(player.car_id, "carry_setup") {
            Some(c) => c,
            None => return 0.0,
        };
        cooldown.tick(step.curr.delta_time);

        let mut total = 0.0;
        if dribbling {
            total += params.dribble_scale;
        }

        if let Some(prev) = step.prev_player(player) {
            let popped = just_left_ground(prev, player)
                && step.curr.ball.vel.z >= params.min_pop_vel
                && (step.curr.ball.pos.xy() - player.pos.xy()).norm()
                    <= params.max_dribble_dist;
            if popped && cooldown.ready() {
                cooldown.fire();
                total += params.pop_bonus;
            }
        }
        total
    }

    fn name(&self) -> &str {
        "carry_setup"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.cooldowns.reset_with(&initial.players, |_| Cooldown::new(period));
    }
}

// ============================================================================
// CarryStartReward
// ============================================================================

/// Bonuses for the touch that opens a carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarryStartParams {
    pub geometry: CarryGeometry,
    pub carry: CarryParams,
    /// Per-agent refractory period
    pub cooldown: f32,
    /// Distance from the attacked goal mapped over this range for the
    /// runway bonus (more field ahead means more carry to come)
    pub min_goal_dist: f32,
    pub max_goal_dist: f32,
}

impl Default for CarryStartParams {
    fn default() -> Self {
        Self {
            geometry: CarryGeometry::default(),
            carry: CarryParams::default(),
            cooldown: 2.0,
            min_goal_dist: 1500.0,
            max_goal_dist: 8000.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StartState {
    cooldown: Cooldown,
    was_conditions: bool,
}

/// One-shot payout on the first aerial touch that opens a carry
///
/// Scaled by remaining boost (fuel for the rest of the carry) and by how
/// much field lies between the ball and the attacked goal.
#[derive(Debug, Clone, Default)]
pub struct CarryStartReward {
    pub params: CarryStartParams,
    agents: AgentMap<StartState>,
}

impl CarryStartReward {
    pub fn new(params: CarryStartParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for CarryStartReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let state = match self.agents.get_mut(player.car_id, "carry_start") {
            Some(s) => s,
            None => return 0.0,
        };
        state.cooldown.tick(step.curr.delta_time);

        let conditions =
            carry_conditions(player, step.curr, &params.geometry, &params.carry);
        let opening = conditions && !state.was_conditions && player.ball_touched_step;
        state.was_conditions = conditions;

        if !opening || !state.cooldown.ready() {
            return 0.0;
        }
        state.cooldown.fire();

        let fuel = 0.5 + 0.5 * (player.boost / car::MAX_BOOST).clamp(0.0, 1.0);
        let goal_dist =
            (player.team.attacking_goal_center() - step.curr.ball.pos).norm();
        let runway = unit_range(goal_dist, params.min_goal_dist, params.max_goal_dist);
        fuel * (0.5 + 0.5 * runway)
    }

    fn name(&self) -> &str {
        "carry_start"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.agents.reset_with(&initial.players, |_| StartState {
            cooldown: Cooldown::new(period),
            was_conditions: false,
        });
    }
}

// ============================================================================
// CarryGoalReward
// ============================================================================

/// Scaling for finishing a goal off a carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarryGoalParams {
    pub geometry: CarryGeometry,
    pub carry: CarryParams,
    /// Minimum accumulated control time for the goal to count as carried
    pub min_control_time: f32,
    /// Carry distance that earns the full distance multiplier
    pub full_mult_dist: f32,
    /// Cap on the distance multiplier
    pub max_mult: f32,
}

impl Default for CarryGoalParams {
    fn default() -> Self {
        Self {
            geometry: CarryGeometry::default(),
            carry: CarryParams::default(),
            min_control_time: 0.5,
            full_mult_dist: 5000.0,
            max_mult: 3.0,
        }
    }
}

/// Terminal-tick payout when the agent's team scores while this agent is
/// mid-carry, scaled by how far the carry traveled
#[derive(Debug, Clone, Default)]
pub struct CarryGoalReward {
    pub params: CarryGoalParams,
    agents: AgentMap<CarryTracker>,
}

impl CarryGoalReward {
    pub fn new(params: CarryGoalParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for CarryGoalReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let tracker = match self.agents.get_mut(player.car_id, "carry_goal") {
            Some(t) => t,
            None => return 0.0,
        };

        let dt = step.curr.delta_time;
        tracker.note_boost(player.controls.boost > 0.0, dt);
        let conditions = carry_conditions(player, step.curr, &params.geometry, &params.carry)
            && tracker.boosting_within_grace(&params.carry);
        tracker.update(
            conditions,
            player.ball_touched_step,
            step.curr.ball.pos.z,
            player.pos,
            dt,
            &params.carry,
        );

        if !step.is_final || !step.curr.goal_scored {
            return 0.0;
        }
        if crate::events::scoring_team(step.curr) != Some(player.team) {
            return 0.0;
        }
        if tracker.control_time() < params.min_control_time {
            return 0.0;
        }

        let carried = (player.pos.xy() - tracker.start_pos().xy()).norm();
        1.0 + (params.max_mult - 1.0) * (carried / params.full_mult_dist).min(1.0)
    }

    fn name(&self) -> &str {
        "carry_goal"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents.reset(&initial.players);
    }
}
