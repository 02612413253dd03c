//! Reward components
//!
//! Every scoring unit implements [`RewardFunction`]: reset once per
//! episode with the initial roster, then one evaluation per agent per
//! tick. Components are independent by contract: each is a function of
//! its own private state plus the supplied step, never of another
//! component, and the same state sequence always produces the same score
//! sequence.
//!
//! ## Component families
//!
//! - [`basic`] - airborne/facing/velocity shaping, touch strength, goals
//! - [`boost`] - boost pickup and economy
//! - [`shot`] - continuous shot quality and the guaranteed-shot bonus
//! - [`double_touch`] - two-touch windows, setup touches, trajectory hold
//! - [`aerial_carry`] - sustained aerial ball control pipeline
//! - [`kickoff`] - kickoff speed and first-touch attribution
//! - [`mechanics`] - cooldown-gated movement mechanics
//!
//! Weighted aggregation lives in [`composite`]; the per-environment
//! lifecycle facade is [`crate::engine::ShapingEngine`].

pub mod aerial_carry;
pub mod basic;
pub mod boost;
pub mod composite;
pub mod double_touch;
pub mod kickoff;
pub mod mechanics;
pub mod shot;

pub use composite::WeightedRewards;

use crate::math::{alignment, Vec3};
use crate::physics_constants::goal;
use crate::state::{GameState, Player, PhysicsObject, Step, Team};

// ============================================================================
// RewardFunction Trait
// ============================================================================

/// Contract every scoring unit implements
///
/// `Send + Sync` because many environment instances run in parallel, each
/// owning its own component set; nothing is shared across environments.
pub trait RewardFunction: Send + Sync {
    /// Compute this tick's score for one agent
    ///
    /// Must depend only on this unit's private state and the supplied
    /// step. Components that need a frame delta return exactly 0 when
    /// `step.prev` is absent. Outputs are always finite.
    fn compute(&mut self, player: &Player, step: &Step<'_>) -> f32;

    /// Component name for configuration, logging, and breakdowns
    fn name(&self) -> &str;

    /// Reinitialize all per-agent state for the roster of the initial
    /// state, discarding anything from a previous episode
    ///
    /// Stateless components keep the default no-op.
    fn reset(&mut self, _initial: &GameState) {}
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Aim point on the attacked goal at a fraction of the opening height
///
/// The carry family aims at 75% of the crossbar so shots that clip the
/// bar still count as goalward.
pub fn goal_aim_target(team: Team, height_frac: f32) -> Vec3 {
    let mut target = team.attacking_goal_center();
    target.z = goal::HEIGHT * height_frac;
    target
}

/// Cosine between the ball's velocity and the direction to the attacked
/// goal's aim point; 0 when either direction is undefined
pub fn ball_goal_alignment(ball: &PhysicsObject, team: Team, height_frac: f32) -> f32 {
    alignment(ball.vel, goal_aim_target(team, height_frac) - ball.pos)
}

/// True when the goal on this `goal_scored` tick went into the player's
/// own net
pub fn conceded(team: Team, state: &GameState) -> bool {
    crate::events::scoring_team(state) == Some(team.opponent())
}
