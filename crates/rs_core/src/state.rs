//! Per-tick game state handed in by the simulator
//!
//! A `GameState` is an immutable snapshot created once per tick. The engine
//! receives the current snapshot plus an optional reference to the previous
//! one (absent on the first tick of an episode) bundled in a [`Step`]; every
//! component that needs a frame-to-frame delta must return 0 when the
//! previous snapshot is missing.

use crate::math::Vec3;
use crate::physics_constants::goal;

// ============================================================================
// Team
// ============================================================================

/// One of the two teams
///
/// Blue defends the -y back wall and attacks +y; Orange is the mirror.
/// This is a pure sign convention: all team-relative geometry is recomputed
/// from it every tick, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Blue,
    Orange,
}

impl Team {
    /// The opposing team
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }

    /// Sign of the y direction this team attacks toward
    pub fn attack_sign(self) -> f32 {
        match self {
            Team::Blue => 1.0,
            Team::Orange => -1.0,
        }
    }

    /// Team whose half of the field contains the given y coordinate
    pub fn from_half(y: f32) -> Team {
        if y < 0.0 {
            Team::Blue
        } else {
            Team::Orange
        }
    }

    /// Center of the goal this team shoots at, at ground level
    pub fn attacking_goal_center(self) -> Vec3 {
        Vec3::new(0.0, self.attack_sign() * goal::PLANE_Y, 0.0)
    }

    /// Center of the goal this team defends, at ground level
    pub fn defending_goal_center(self) -> Vec3 {
        self.opponent().attacking_goal_center()
    }
}

// ============================================================================
// Physics bodies
// ============================================================================

/// Kinematic state of a rigid body (ball or car)
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsObject {
    pub pos: Vec3,
    pub vel: Vec3,
    pub ang_vel: Vec3,
}

/// Most recent controller inputs, as applied by the simulator this tick
///
/// Analog axes are in [0, 1] (boost, handbrake) or [-1, 1] (roll).
#[derive(Debug, Clone, Copy, Default)]
pub struct Controls {
    pub boost: f32,
    pub handbrake: f32,
    pub roll: f32,
}

/// One controllable car
#[derive(Debug, Clone)]
pub struct Player {
    /// Stable identity, persists across ticks within an episode
    pub car_id: u32,
    pub team: Team,
    /// Slot in `GameState::players`; used to cross-reference the previous
    /// snapshot, not guaranteed stable across episodes
    pub index: usize,

    pub pos: Vec3,
    pub vel: Vec3,
    pub ang_vel: Vec3,
    /// Orientation basis: the car's nose direction
    pub forward: Vec3,
    /// Orientation basis: the car's roof direction
    pub up: Vec3,

    /// Boost amount, 0..=100
    pub boost: f32,
    pub on_ground: bool,
    /// True only on the tick the simulator registered a ball contact
    pub ball_touched_step: bool,
    pub is_flipping: bool,
    pub has_double_jumped: bool,
    /// Relative torque of the active flip; y < 0 is a backflip
    pub flip_rel_torque: Vec3,
    pub controls: Controls,
}

// ============================================================================
// GameState
// ============================================================================

/// Immutable snapshot of one simulation tick
#[derive(Debug, Clone)]
pub struct GameState {
    pub ball: PhysicsObject,
    /// Ordered roster; indices are stable within an episode
    pub players: Vec<Player>,
    /// Seconds since the previous tick, always > 0
    pub delta_time: f32,
    /// Set on the tick a goal is detected
    pub goal_scored: bool,
    /// Availability of the 34 standard boost pads, index-aligned with
    /// `physics_constants::boost::PAD_LOCATIONS`
    pub boost_pads: [bool; crate::physics_constants::boost::PAD_COUNT],
    /// Monotone tick index within the episode
    pub tick_count: u64,
}

/// One evaluation step: the current snapshot, the previous one when the
/// episode has history, and whether this is the terminal tick
#[derive(Clone, Copy)]
pub struct Step<'a> {
    pub curr: &'a GameState,
    pub prev: Option<&'a GameState>,
    pub is_final: bool,
}

impl<'a> Step<'a> {
    pub fn new(curr: &'a GameState, prev: Option<&'a GameState>, is_final: bool) -> Self {
        Self { curr, prev, is_final }
    }

    /// The same player's record in the previous snapshot, if any
    pub fn prev_player(&self, player: &Player) -> Option<&'a Player> {
        self.prev.and_then(|s| s.players.get(player.index))
    }

    /// The ball in the previous snapshot, if any
    pub fn prev_ball(&self) -> Option<&'a PhysicsObject> {
        self.prev.map(|s| &s.ball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_sign_convention() {
        assert_eq!(Team::Blue.attack_sign(), 1.0);
        assert_eq!(Team::Orange.attack_sign(), -1.0);
        assert_eq!(Team::Blue.opponent(), Team::Orange);

        // Blue attacks the +y goal, defends the -y goal
        assert!(Team::Blue.attacking_goal_center().y > 0.0);
        assert!(Team::Blue.defending_goal_center().y < 0.0);
        assert_eq!(
            Team::Orange.attacking_goal_center(),
            Team::Blue.defending_goal_center()
        );
    }

    #[test]
    fn test_team_from_half() {
        assert_eq!(Team::from_half(-100.0), Team::Blue);
        assert_eq!(Team::from_half(100.0), Team::Orange);
    }

    #[test]
    fn test_step_prev_lookup() {
        let prev = crate::test_fixtures::state_1v1();
        let mut curr = prev.clone();
        curr.players[0].boost = 55.0;

        let step = Step::new(&curr, Some(&prev), false);
        let p = &curr.players[0];
        assert_eq!(step.prev_player(p).unwrap().car_id, p.car_id);

        let first = Step::new(&curr, None, false);
        assert!(first.prev_player(p).is_none());
        assert!(first.prev_ball().is_none());
    }
}
