//! Centralized test helpers
//!
//! Synthetic `GameState` construction for unit tests. Eliminates duplicated
//! setup across reward component tests.

use crate::math::Vec3;
use crate::physics_constants::boost;
use crate::state::{Controls, GameState, Player, PhysicsObject, Team};

/// Tick duration used by all synthetic states (120 Hz sim, tick skip 8)
pub const TEST_DT: f32 = 1.0 / 15.0;

/// A grounded, stationary player at a plausible kickoff spot
pub fn player(car_id: u32, index: usize, team: Team) -> Player {
    Player {
        car_id,
        team,
        index,
        pos: Vec3::new(0.0, team.attack_sign() * -2048.0, 17.0),
        vel: Vec3::zeros(),
        ang_vel: Vec3::zeros(),
        forward: Vec3::new(0.0, team.attack_sign(), 0.0),
        up: Vec3::new(0.0, 0.0, 1.0),
        boost: 33.0,
        on_ground: true,
        ball_touched_step: false,
        is_flipping: false,
        has_double_jumped: false,
        flip_rel_torque: Vec3::zeros(),
        controls: Controls::default(),
    }
}

/// Kickoff state: ball at center at rest, one car per team
pub fn state_1v1() -> GameState {
    GameState {
        ball: PhysicsObject {
            pos: Vec3::new(0.0, 0.0, 93.15),
            vel: Vec3::zeros(),
            ang_vel: Vec3::zeros(),
        },
        players: vec![player(1, 0, Team::Blue), player(2, 1, Team::Orange)],
        delta_time: TEST_DT,
        goal_scored: false,
        boost_pads: [true; boost::PAD_COUNT],
        tick_count: 0,
    }
}

/// Kickoff state with a full 3v3 roster
///
/// Blue cars 1..=3 at indices 0..3, orange cars 4..=6 at indices 3..6.
pub fn state_3v3() -> GameState {
    let mut state = state_1v1();
    state.players = (0..3)
        .map(|i| player(i as u32 + 1, i, Team::Blue))
        .chain((0..3).map(|i| player(i as u32 + 4, i + 3, Team::Orange)))
        .collect();
    state
}

/// Clone a state as the next tick (same roster, incremented tick count)
pub fn next_tick(state: &GameState) -> GameState {
    let mut next = state.clone();
    next.tick_count += 1;
    for p in &mut next.players {
        p.ball_touched_step = false;
    }
    next
}
