//! Boost-economy components
//!
//! Pickup credit, big-pad priority, efficiency weighting by how empty the
//! tank was, pad seeking when low, and landing on a pad out of the air.
//! All pickup detection runs off the frame-to-frame boost delta plus the
//! pad availability mask.

use serde::{Deserialize, Serialize};

use crate::events::{classify_boost_pickup, BoostPickup};
use crate::math::{unit_range, Vec3};
use crate::physics_constants::{boost, car};
use crate::state::{GameState, Player, Step};
use crate::trackers::{AgentMap, AirTime, Cooldown};

use super::RewardFunction;

// ============================================================================
// PickupBoostReward
// ============================================================================

/// Boost gained this tick as a fraction of a full tank
#[derive(Debug, Clone, Copy, Default)]
pub struct PickupBoostReward;

impl RewardFunction for PickupBoostReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };
        (player.boost - prev.boost).max(0.0) / car::MAX_BOOST
    }

    fn name(&self) -> &str {
        "pickup_boost"
    }
}

// ============================================================================
// BigBoostReward
// ============================================================================

/// Unit reward for collecting a full pad
#[derive(Debug, Clone, Copy, Default)]
pub struct BigBoostReward;

impl RewardFunction for BigBoostReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };
        match classify_boost_pickup(prev, player) {
            Some(BoostPickup::Big) => 1.0,
            _ => 0.0,
        }
    }

    fn name(&self) -> &str {
        "big_boost"
    }
}

// ============================================================================
// BoostEfficiencyReward
// ============================================================================

/// Pickup credit weighted by how empty the tank was
///
/// Grabbing a pad at 10 boost pays near-full; topping off at 95 pays
/// almost nothing. The weight is the pre-pickup empty fraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostEfficiencyReward;

impl RewardFunction for BoostEfficiencyReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };
        let gained = (player.boost - prev.boost).max(0.0) / car::MAX_BOOST;
        let empty_frac = 1.0 - (prev.boost / car::MAX_BOOST).clamp(0.0, 1.0);
        gained * empty_frac
    }

    fn name(&self) -> &str {
        "boost_efficiency"
    }
}

// ============================================================================
// BoostPadProximityReward
// ============================================================================

/// Thresholds for pad seeking
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PadProximityParams {
    /// Component is silent above this boost amount
    pub low_boost: f32,
    /// Distance at which the proximity signal reaches zero
    pub range: f32,
}

impl Default for PadProximityParams {
    fn default() -> Self {
        Self { low_boost: 30.0, range: 3000.0 }
    }
}

/// When low on boost, reward proximity to the nearest available pad
///
/// Taken pads (mask false) are skipped; if every pad is down the signal
/// is zero. Distance is measured in the ground plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostPadProximityReward {
    pub params: PadProximityParams,
}

fn nearest_available_pad_dist(pos: Vec3, pads: &[bool; boost::PAD_COUNT]) -> Option<f32> {
    boost::PAD_LOCATIONS
        .iter()
        .zip(pads.iter())
        .filter(|(_, available)| **available)
        .map(|((x, y, _), _)| {
            let dx = pos.x - x;
            let dy = pos.y - y;
            (dx * dx + dy * dy).sqrt()
        })
        .min_by(|a, b| a.total_cmp(b))
}

impl RewardFunction for BoostPadProximityReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        if player.boost >= self.params.low_boost {
            return 0.0;
        }
        match nearest_available_pad_dist(player.pos, &step.curr.boost_pads) {
            Some(dist) => 1.0 - unit_range(dist, 0.0, self.params.range),
            None => 0.0,
        }
    }

    fn name(&self) -> &str {
        "boost_pad_proximity"
    }
}

// ============================================================================
// LandOnBoostReward
// ============================================================================

/// Gating for landing-on-pad credit
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandOnBoostParams {
    /// Micro-hops below this airtime do not count as landings
    pub min_airtime: f32,
    /// Per-agent refractory period between payouts
    pub cooldown: f32,
}

impl Default for LandOnBoostParams {
    fn default() -> Self {
        Self { min_airtime: 0.5, cooldown: 2.0 }
    }
}

#[derive(Debug, Clone, Copy)]
struct LandState {
    air: AirTime,
    cooldown: Cooldown,
}

/// Unit reward for coming down from a real jump directly onto a pad
///
/// Fires on the landing tick when the airtime gate passes and boost was
/// gained on that same tick, at most once per cooldown period per agent.
#[derive(Debug, Clone, Default)]
pub struct LandOnBoostReward {
    pub params: LandOnBoostParams,
    agents: AgentMap<LandState>,
}

impl LandOnBoostReward {
    pub fn new(params: LandOnBoostParams) -> Self {
        Self { params, agents: AgentMap::new() }
    }
}

impl RewardFunction for LandOnBoostReward {
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32 {
        let state = match self.agents.get_mut(player.car_id, "land_on_boost") {
            Some(s) => s,
            None => return 0.0,
        };
        state.cooldown.tick(step.curr.delta_time);
        let landed_after = state.air.update(player.on_ground, step.curr.delta_time);

        let prev = match step.prev_player(player) {
            Some(p) => p,
            None => return 0.0,
        };

        match landed_after {
            Some(t) if t >= self.params.min_airtime => {}
            _ => return 0.0,
        }

        if classify_boost_pickup(prev, player).is_none() {
            return 0.0;
        }
        if !state.cooldown.ready() {
            return 0.0;
        }
        state.cooldown.fire();
        1.0
    }

    fn name(&self) -> &str {
        "land_on_boost"
    }

    fn reset(&mut self, initial: &GameState) {
        let cooldown = self.params.cooldown;
        self.agents.reset_with(&initial.players, |p| LandState {
            air: AirTime::starting(p.on_ground),
            cooldown: Cooldown::new(cooldown),
        });
    }
}
