//! Movement-mechanics components
//!
//! One-shot, cooldown-gated payouts for executing specific mechanics:
//! powerslides, half flips, wavedashes, directional flips, fast aerials,
//! and clean recovery landings. These are training-wheel signals, meant to
//! be weighted small and removed as the policy matures.

use serde::{Deserialize, Serialize};

use crate::events::{just_double_jumped, just_landed};
use crate::math::{alignment, unit_range, normalize_or_zero};
use crate::physics_constants::car;
use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, AirTime, Cooldown};

use super::RewardFunction;

// ============================================================================
// PowerslideReward
// ============================================================================

/// Thresholds for the powerslide signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerslideParams {
    /// Minimum ground speed for a slide to count
    pub min_speed: f32,
    /// Yaw rate range mapped to [0, 1]
    pub min_yaw_rate: f32,
    pub max_yaw_rate: f32,
}

impl Default for PowerslideParams {
    fn default() -> Self {
        Self { min_speed: 500.0, min_yaw_rate: 1.0, max_yaw_rate: car::MAX_ANG_VEL }
    }
}

/// Per-tick signal while handbrake-turning at speed
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerslideReward {
    pub params: PowerslideParams,
}

impl RewardFunction for PowerslideReward {
    fn compute(&mut self, player: &Player, _step: &Step<'_>) -> f32 {
        if !player.on_ground || player.controls.handbrake <= 0.0 {
            return 0.0;
        }
        if player.vel.norm() < self.params.min_speed {
            return 0.0;
        }
        let yaw_rate = player.ang_vel.z.abs();
        player.controls.handbrake
            * unit_range(yaw_rate, self.params.min_yaw_rate, self.params.max_yaw_rate)
    }

    fn name(&self) -> &str {
        "powerslide"
    }
}

// ============================================================================
// HalfFlipReward
// ============================================================================

/// Gating for half-flip detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfFlipParams {
    /// Minimum reverse speed when the backflip starts
    pub min_reverse_speed: f32,
    /// Backflip torque threshold (y component, negative is backward)
    pub max_torque_y: f32,
    pub cooldown: f32,
}

impl Default for HalfFlipParams {
    fn default() -> Self {
        Self { min_reverse_speed: 400.0, max_torque_y: -0.5, cooldown: 2.0 }
    }
}

#[derive(Debug, Clone, Copy)]
struct FlipAgent {
    cooldown: Cooldown,
}

/// One-shot payout for starting a backflip while reversing, the opening
/// move of a half flip
#[derive(Debug, Clone, Default)]
pub struct HalfFlipReward {
    pub params: HalfFlipParams,
    agents: AgentMap<FlipAgent>,
}

impl HalfFlipReward {
    pub fn new(params: HalfFlipParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for HalfFlipReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let agent = match self.agents.get_mut(player.car_id, "half_flip") {
            Some(a) => a,
            None => return 0.0,
        };
        agent.cooldown.tick(step.curr.delta_time);

        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };

        let flip_started = player.is_flipping && !prev.is_flipping;
        if !flip_started {
            return 0.0;
        }
        if player.flip_rel_torque.y > params.max_torque_y {
            return 0.0;
        }
        // Reversing: travel opposes the nose
        if player.vel.dot(&player.forward) > -params.min_reverse_speed {
            return 0.0;
        }
        if !agent.cooldown.ready() {
            return 0.0;
        }
        agent.cooldown.fire();
        1.0
    }

    fn name(&self) -> &str {
        "half_flip"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.agents
            .reset_with(&initial.players, |_| FlipAgent { cooldown: Cooldown::new(period) });
    }
}

// ============================================================================
// WavedashReward
// ============================================================================

/// Gating for wavedash detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WavedashParams {
    /// Minimum speed gained across the landing tick
    pub min_speed_gain: f32,
    pub cooldown: f32,
}

impl Default for WavedashParams {
    fn default() -> Self {
        Self { min_speed_gain: 100.0, cooldown: 2.0 }
    }
}

/// One-shot payout for landing mid-flip with a speed gain, the signature
/// of a wavedash
#[derive(Debug, Clone, Default)]
pub struct WavedashReward {
    pub params: WavedashParams,
    agents: AgentMap<FlipAgent>,
}

impl WavedashReward {
    pub fn new(params: WavedashParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for WavedashReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let agent = match self.agents.get_mut(player.car_id, "wavedash") {
            Some(a) => a,
            None => return 0.0,
        };
        agent.cooldown.tick(step.curr.delta_time);

        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };

        if !just_landed(prev, player) || !player.is_flipping {
            return 0.0;
        }
        let gain = player.vel.norm() - prev.vel.norm();
        if gain < params.min_speed_gain {
            return 0.0;
        }
        if !agent.cooldown.ready() {
            return 0.0;
        }
        agent.cooldown.fire();
        unit_range(player.vel.norm(), 0.0, car::MAX_SPEED)
    }

    fn name(&self) -> &str {
        "wavedash"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.agents
            .reset_with(&initial.players, |_| FlipAgent { cooldown: Cooldown::new(period) });
    }
}

// ============================================================================
// DirectionalFlipReward
// ============================================================================

/// Gating for directional-flip detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectionalFlipParams {
    /// Minimum speed when the flip starts
    pub min_speed: f32,
    /// Required cosine between travel direction and the nose
    pub min_alignment: f32,
    pub cooldown: f32,
}

impl Default for DirectionalFlipParams {
    fn default() -> Self {
        Self { min_speed: 800.0, min_alignment: 0.7, cooldown: 2.0 }
    }
}

/// One-shot payout for flipping into the direction of travel at speed,
/// scaled by how fast the car already is
#[derive(Debug, Clone, Default)]
pub struct DirectionalFlipReward {
    pub params: DirectionalFlipParams,
    agents: AgentMap<FlipAgent>,
}

impl DirectionalFlipReward {
    pub fn new(params: DirectionalFlipParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for DirectionalFlipReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let agent = match self.agents.get_mut(player.car_id, "directional_flip") {
            Some(a) => a,
            None => return 0.0,
        };
        agent.cooldown.tick(step.curr.delta_time);

        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };
        let flip_started = player.is_flipping && !prev.is_flipping;
        if !flip_started {
            return 0.0;
        }

        let speed = player.vel.norm();
        if speed < params.min_speed {
            return 0.0;
        }
        if alignment(player.vel, player.forward) < params.min_alignment {
            return 0.0;
        }
        if !agent.cooldown.ready() {
            return 0.0;
        }
        agent.cooldown.fire();
        unit_range(speed, params.min_speed, car::MAX_SPEED)
    }

    fn name(&self) -> &str {
        "directional_flip"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.agents
            .reset_with(&initial.players, |_| FlipAgent { cooldown: Cooldown::new(period) });
    }
}

// ============================================================================
// FastAerialReward
// ============================================================================

/// Gating for fast-aerial detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FastAerialParams {
    /// The double jump must come within this long after leaving the ground
    pub max_jump_gap: f32,
    /// Minimum nose pitch (z component of forward) at the double jump
    pub min_pitch: f32,
    /// Minimum upward velocity at the double jump
    pub min_up_vel: f32,
    pub cooldown: f32,
}

impl Default for FastAerialParams {
    fn default() -> Self {
        Self { max_jump_gap: 0.4, min_pitch: 0.4, min_up_vel: 400.0, cooldown: 2.0 }
    }
}

#[derive(Debug, Clone, Copy)]
struct AerialAgent {
    air: AirTime,
    cooldown: Cooldown,
}

/// One-shot payout for the fast-aerial opener: jump, pitch back, double
/// jump quickly while boosting
#[derive(Debug, Clone, Default)]
pub struct FastAerialReward {
    pub params: FastAerialParams,
    agents: AgentMap<AerialAgent>,
}

impl FastAerialReward {
    pub fn new(params: FastAerialParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for FastAerialReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let agent = match self.agents.get_mut(player.car_id, "fast_aerial") {
            Some(a) => a,
            None => return 0.0,
        };
        agent.cooldown.tick(step.curr.delta_time);
        let airborne_before = agent.air.airborne_for();
        agent.air.update(player.on_ground, step.curr.delta_time);

        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };
        if !just_double_jumped(prev, player) {
            return 0.0;
        }

        if airborne_before > params.max_jump_gap {
            return 0.0;
        }
        if player.forward.z < params.min_pitch {
            return 0.0;
        }
        if player.vel.z < params.min_up_vel {
            return 0.0;
        }
        if player.controls.boost <= 0.0 {
            return 0.0;
        }
        if !agent.cooldown.ready() {
            return 0.0;
        }
        agent.cooldown.fire();
        1.0
    }

    fn name(&self) -> &str {
        "fast_aerial"
    }

    fn reset(&mut self, initial: &GameState) {
        let period = self.params.cooldown;
        self.agents.reset_with(&initial.players, |p| AerialAgent {
            air: AirTime::starting(p.on_ground),
            cooldown: Cooldown::new(period),
        });
    }
}

// ============================================================================
// RecoveryLandingReward
// ============================================================================

/// Gating for recovery-landing scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecoveryParams {
    /// Micro-hops below this airtime do not count
    pub min_airtime: f32,
    /// Roof z component required for a wheels-down landing
    pub min_up_z: f32,
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self { min_airtime: 0.5, min_up_z: 0.9 }
    }
}

/// Payout on the landing tick for coming down wheels-first, nose into the
/// direction of travel, so momentum carries through the landing
#[derive(Debug, Clone, Default)]
pub struct RecoveryLandingReward {
    pub params: RecoveryParams,
    agents: AgentMap<AirTime>,
}

impl RecoveryLandingReward {
    pub fn new(params: RecoveryParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for RecoveryLandingReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let params = self.params;
        let air = match self.agents.get_mut(player.car_id, "recovery_landing") {
            Some(a) => a,
            None => return 0.0,
        };

        let landed_after = air.update(player.on_ground, step.curr.delta_time);
        match landed_after {
            Some(t) if t >= params.min_airtime => {}
            _ => return 0.0,
        }
        if player.up.z < params.min_up_z {
            return 0.0;
        }

        let travel = normalize_or_zero(player.vel);
        let momentum = alignment(player.forward, travel).max(0.0);
        0.5 + 0.5 * momentum
    }

    fn name(&self) -> &str {
        "recovery_landing"
    }

    fn reset(&mut self, initial: &GameState) {
        self.agents
            .reset_with(&initial.players, |p| AirTime::starting(p.on_ground));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::test_fixtures::{next_tick, state_1v1};

    #[test]
    fn test_powerslide_requires_handbrake_speed_and_yaw() {
        let mut reward = PowerslideReward::default();
        let mut state = state_1v1();
        let p = &mut state.players[0];
        p.vel = Vec3::new(1200.0, 0.0, 0.0);
        p.ang_vel = Vec3::new(0.0, 0.0, 3.0);
        p.controls.handbrake = 1.0;

        let step = Step::new(&state, None, false);
        let sliding = reward.compute(&state.players[0], &step);
        assert!(sliding > 0.0);

        state.players[0].controls.handbrake = 0.0;
        let step = Step::new(&state, None, false);
        assert_eq!(reward.compute(&state.players[0], &step), 0.0);

        state.players[0].controls.handbrake = 1.0;
        state.players[0].vel = Vec3::new(200.0, 0.0, 0.0);
        let step = Step::new(&state, None, false);
        assert_eq!(reward.compute(&state.players[0], &step), 0.0);
    }

    #[test]
    fn test_half_flip_on_reversing_backflip() {
        let initial = state_1v1();
        let mut reward = HalfFlipReward::default();
        reward.reset(&initial);

        // Reversing fast, nose +y, travel -y
        let mut prev = state_1v1();
        prev.players[0].vel = Vec3::new(0.0, -900.0, 0.0);
        let mut curr = next_tick(&prev);
        curr.players[0].vel = Vec3::new(0.0, -900.0, 0.0);
        curr.players[0].is_flipping = true;
        curr.players[0].flip_rel_torque = Vec3::new(0.0, -1.0, 0.0);

        let step = Step::new(&curr, Some(&prev), false);
        assert_eq!(reward.compute(&curr.players[0], &step), 1.0);

        // A forward flip while reversing is not a half flip
        let mut fresh = HalfFlipReward::default();
        fresh.reset(&initial);
        let mut forward = curr.clone();
        forward.players[0].flip_rel_torque = Vec3::new(0.0, 1.0, 0.0);
        let step = Step::new(&forward, Some(&prev), false);
        assert_eq!(fresh.compute(&forward.players[0], &step), 0.0);
    }

    #[test]
    fn test_wavedash_needs_landing_speed_gain() {
        let initial = state_1v1();
        let mut reward = WavedashReward::default();
        reward.reset(&initial);

        let mut prev = state_1v1();
        prev.players[0].on_ground = false;
        prev.players[0].vel = Vec3::new(0.0, 1200.0, -200.0);

        let mut curr = next_tick(&prev);
        curr.players[0].on_ground = true;
        curr.players[0].is_flipping = true;
        curr.players[0].vel = Vec3::new(0.0, 1700.0, 0.0);

        let step = Step::new(&curr, Some(&prev), false);
        let r = reward.compute(&curr.players[0], &step);
        assert!(r > 0.0);

        // Landing without the flip is just a landing
        let mut fresh = WavedashReward::default();
        fresh.reset(&initial);
        let mut plain = curr.clone();
        plain.players[0].is_flipping = false;
        let step = Step::new(&plain, Some(&prev), false);
        assert_eq!(fresh.compute(&plain.players[0], &step), 0.0);
    }

    #[test]
    fn test_directional_flip_scales_with_speed() {
        let initial = state_1v1();
        let mut slow = DirectionalFlipReward::default();
        let mut fast = DirectionalFlipReward::default();
        slow.reset(&initial);
        fast.reset(&initial);

        let mut prev = state_1v1();
        prev.players[0].vel = Vec3::new(0.0, 1000.0, 0.0);
        let mut curr = next_tick(&prev);
        curr.players[0].vel = Vec3::new(0.0, 1000.0, 0.0);
        curr.players[0].is_flipping = true;

        let step = Step::new(&curr, Some(&prev), false);
        let slow_r = slow.compute(&curr.players[0], &step);
        assert!(slow_r > 0.0);

        let mut quick_prev = state_1v1();
        quick_prev.players[0].vel = Vec3::new(0.0, 2000.0, 0.0);
        let mut quick = next_tick(&quick_prev);
        quick.players[0].vel = Vec3::new(0.0, 2000.0, 0.0);
        quick.players[0].is_flipping = true;

        let step = Step::new(&quick, Some(&quick_prev), false);
        let fast_r = fast.compute(&quick.players[0], &step);
        assert!(fast_r > slow_r);
    }

    #[test]
    fn test_fast_aerial_requires_quick_double_jump() {
        let initial = state_1v1();
        let mut reward = FastAerialReward::default();
        reward.reset(&initial);

        // Leave the ground, pitch up, boost
        let mut prev = state_1v1();
        prev.players[0].on_ground = false;
        prev.players[0].forward = Vec3::new(0.0, 0.6, 0.8);
        prev.players[0].vel = Vec3::new(0.0, 300.0, 600.0);
        prev.players[0].controls.boost = 1.0;

        // Two ticks in the air, then the double jump
        for _ in 0..2 {
            let step = Step::new(&prev, None, false);
            assert_eq!(reward.compute(&prev.players[0], &step), 0.0);
        }
        let mut curr = next_tick(&prev);
        curr.players[0].has_double_jumped = true;
        let step = Step::new(&curr, Some(&prev), false);
        assert_eq!(reward.compute(&curr.players[0], &step), 1.0);
    }

    #[test]
    fn test_fast_aerial_rejects_late_double_jump() {
        let initial = state_1v1();
        let mut reward = FastAerialReward::default();
        reward.reset(&initial);

        let mut prev = state_1v1();
        prev.players[0].on_ground = false;
        prev.players[0].forward = Vec3::new(0.0, 0.6, 0.8);
        prev.players[0].vel = Vec3::new(0.0, 300.0, 600.0);
        prev.players[0].controls.boost = 1.0;

        // Hang in the air for a full second first
        for _ in 0..15 {
            let step = Step::new(&prev, None, false);
            reward.compute(&prev.players[0], &step);
        }
        let mut curr = next_tick(&prev);
        curr.players[0].has_double_jumped = true;
        let step = Step::new(&curr, Some(&prev), false);
        assert_eq!(reward.compute(&curr.players[0], &step), 0.0);
    }

    #[test]
    fn test_recovery_landing_prefers_wheels_down_rolling() {
        let initial = state_1v1();
        let mut reward = RecoveryLandingReward::default();
        reward.reset(&initial);

        let mut prev = state_1v1();
        prev.players[0].on_ground = false;
        for _ in 0..15 {
            let step = Step::new(&prev, None, false);
            assert_eq!(reward.compute(&prev.players[0], &step), 0.0);
        }

        // Wheels down, nose into the direction of travel
        let mut curr = next_tick(&prev);
        curr.players[0].on_ground = true;
        curr.players[0].vel = Vec3::new(0.0, 1400.0, 0.0);
        let step = Step::new(&curr, Some(&prev), false);
        let clean = reward.compute(&curr.players[0], &step);
        assert!((clean - 1.0).abs() < 1e-5);

        // Sideways landing pays the wheels-down floor only
        reward.reset(&initial);
        let mut prev2 = state_1v1();
        prev2.players[0].on_ground = false;
        for _ in 0..15 {
            let step = Step::new(&prev2, None, false);
            reward.compute(&prev2.players[0], &step);
        }
        let mut side = next_tick(&prev2);
        side.players[0].on_ground = true;
        side.players[0].vel = Vec3::new(1400.0, 0.0, 0.0);
        let step = Step::new(&side, Some(&prev2), false);
        let sideways = reward.compute(&side.players[0], &step);
        assert!((sideways - 0.5).abs() < 1e-5);
    }
}
