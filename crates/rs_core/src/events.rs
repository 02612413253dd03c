//! Stateless event detectors
//!
//! Pure functions of `(current, previous)` snapshots that demodulate
//! discrete events out of continuous physics signals. Detectors never hold
//! state; per-agent sequencing on top of these lives in [`crate::trackers`].

use serde::{Deserialize, Serialize};

use crate::physics_constants::{arena, ball};
use crate::state::{GameState, Player, Step, Team};

// ============================================================================
// Wall bounces
// ============================================================================

/// Boundary plane a ball bounce was attributed to, relative to the
/// querying team
///
/// Ceiling bounces are classified separately from walls: a ceiling contact
/// is not a usable redirect and sequence trackers treat it as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallBounce {
    OwnBackWall,
    OpponentBackWall,
    SideWall,
    Ceiling,
}

/// Thresholds for wall-bounce classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BounceParams {
    /// Minimum |Δv| across the tick; smaller changes are rounding noise
    pub min_delta_v: f32,
    /// Detection distance of the ball center from each boundary plane
    pub detection_radius: f32,
}

impl Default for BounceParams {
    fn default() -> Self {
        Self {
            min_delta_v: 200.0,
            detection_radius: ball::RADIUS + 160.0,
        }
    }
}

/// Classify a ball bounce off a boundary plane, relative to `team`
///
/// A bounce is attributed to a plane only when the ball sits within the
/// detection radius of that plane and the velocity component normal to it
/// reversed sign across the tick. Planes are tested ceiling first, then
/// back walls, then side walls, so a corner contact resolves to the more
/// consequential classification.
///
/// Returns `None` on the first tick of an episode (no previous state).
pub fn classify_wall_bounce(step: &Step<'_>, team: Team, params: &BounceParams) -> Option<WallBounce> {
    let prev_ball = step.prev_ball()?;
    let curr_ball = &step.curr.ball;

    let delta_v = curr_ball.vel - prev_ball.vel;
    if delta_v.norm() < params.min_delta_v {
        return None;
    }

    let pos = curr_ball.pos;
    let reversed = |before: f32, after: f32| before * after < 0.0;

    if pos.z > arena::CEILING_Z - params.detection_radius
        && reversed(prev_ball.vel.z, curr_ball.vel.z)
    {
        return Some(WallBounce::Ceiling);
    }

    if pos.y.abs() > arena::BACK_WALL_Y - params.detection_radius
        && reversed(prev_ball.vel.y, curr_ball.vel.y)
    {
        // The team defending the half the ball is in owns that back wall
        let wall_owner = Team::from_half(pos.y);
        return Some(if wall_owner == team {
            WallBounce::OwnBackWall
        } else {
            WallBounce::OpponentBackWall
        });
    }

    if pos.x.abs() > arena::SIDE_WALL_X - params.detection_radius
        && reversed(prev_ball.vel.x, curr_ball.vel.x)
    {
        return Some(WallBounce::SideWall);
    }

    None
}

// ============================================================================
// Ground / air transitions
// ============================================================================

/// Edge-triggered: the player left the ground this tick
#[inline]
pub fn just_left_ground(prev: &Player, curr: &Player) -> bool {
    prev.on_ground && !curr.on_ground
}

/// Edge-triggered: the player returned to the ground this tick
///
/// Callers that care about real landings (not micro-hops) must gate this
/// on accumulated airtime, tracked by [`crate::trackers::AirTime`].
#[inline]
pub fn just_landed(prev: &Player, curr: &Player) -> bool {
    !prev.on_ground && curr.on_ground
}

/// Edge-triggered: the player consumed their double jump this tick
#[inline]
pub fn just_double_jumped(prev: &Player, curr: &Player) -> bool {
    !prev.has_double_jumped && curr.has_double_jumped
}

// ============================================================================
// Goal attribution
// ============================================================================

/// Team credited with the goal on a `goal_scored` tick
///
/// The ball is always inside the conceding team's half at the moment a goal
/// registers, so the scorer is the opponent of the team whose half contains
/// the ball. This is a documented convention of the simulator, not a guess.
pub fn scoring_team(state: &GameState) -> Option<Team> {
    if state.goal_scored {
        Some(Team::from_half(state.ball.pos.y).opponent())
    } else {
        None
    }
}

// ============================================================================
// Kickoff detection
// ============================================================================

/// Thresholds for the kickoff-pending predicate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KickoffParams {
    /// Max ball distance from field center
    pub center_radius: f32,
    /// Max ball height above the resting position
    pub max_height: f32,
    /// Max ball speed to still count as stationary
    pub max_speed: f32,
}

impl Default for KickoffParams {
    fn default() -> Self {
        Self { center_radius: 500.0, max_height: 200.0, max_speed: 100.0 }
    }
}

/// True while the ball sits at the center spot waiting to be hit
pub fn kickoff_pending(state: &GameState, params: &KickoffParams) -> bool {
    let pos = state.ball.pos;
    let centered = pos.xy().norm() < params.center_radius && pos.z < params.max_height;
    centered && state.ball.vel.norm() < params.max_speed
}

// ============================================================================
// Boost pickups
// ============================================================================

/// Pad size inferred from the boost gained in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostPickup {
    Big,
    Small,
}

/// Classify a boost pickup from the frame-to-frame boost delta
///
/// Thresholds sit below the nominal pad amounts (100 / 12) to tolerate
/// partial collection when the tank is nearly full.
pub fn classify_boost_pickup(prev: &Player, curr: &Player) -> Option<BoostPickup> {
    let gained = curr.boost - prev.boost;
    if gained >= 90.0 {
        Some(BoostPickup::Big)
    } else if gained >= 10.0 {
        Some(BoostPickup::Small)
    } else {
        None
    }
}
