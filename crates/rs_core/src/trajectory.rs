//! Ballistic trajectory prediction and the "guaranteed shot" classifier
//!
//! Extrapolates the ball under constant gravity to the attacked goal plane
//! and decides whether a shot is provably unsaveable. The classifier is
//! deliberately asymmetric: every gate errs toward "saveable", because a
//! false positive (rewarding a stoppable shot) destabilizes training far
//! more than a missed detection.

use serde::{Deserialize, Serialize};

use crate::math::{alignment, unit_range, Vec3};
use crate::physics_constants::{arena, ball, car, goal};
use crate::state::{GameState, PhysicsObject, Team};

// ============================================================================
// Parameters
// ============================================================================

/// Thresholds for arrival prediction and the guaranteed-shot gates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShotParams {
    /// Hard cap on the computed time-to-goal (seconds)
    pub max_horizon: f32,
    /// Predictions beyond this are unreliable and rejected (seconds)
    pub reliable_horizon: f32,
    /// Balls slower than this are always considered saveable
    pub min_ball_speed: f32,
    /// Required cosine between ball velocity and direction to goal center
    pub min_alignment: f32,
    /// Extra height above the crossbar still counted as on frame
    pub height_margin: f32,
    /// Arrival below this height hits the ground before the line
    pub min_arrival_height: f32,
    /// Extra width beyond the posts still counted as on frame
    pub lateral_margin: f32,
    /// Opponents farther than this from the goal are ignored
    pub defender_radius: f32,
    /// Optimistic defender speed as a fraction of car max speed
    pub defender_speed_frac: f32,
    /// Defender speed multiplier when the save must be aerial
    pub aerial_save_penalty: f32,
    /// Arrival heights above this force an aerial save
    pub aerial_save_height: f32,
    /// Defender reaction time added to every intercept estimate (seconds)
    pub reaction_time: f32,
    /// Intercepts within this margin of arrival still count as saves (seconds)
    pub intercept_buffer: f32,
}

impl Default for ShotParams {
    fn default() -> Self {
        Self {
            max_horizon: 5.0,
            reliable_horizon: 2.0,
            min_ball_speed: 1000.0,
            min_alignment: 0.85,
            height_margin: 50.0,
            min_arrival_height: ball::RADIUS,
            lateral_margin: 50.0,
            defender_radius: 4000.0,
            defender_speed_frac: 0.6,
            aerial_save_penalty: 0.75,
            aerial_save_height: 350.0,
            reaction_time: 0.25,
            intercept_buffer: 0.2,
        }
    }
}

// ============================================================================
// Arrival prediction
// ============================================================================

/// Predicted ball arrival at the attacked goal plane
#[derive(Debug, Clone, Copy)]
pub struct GoalwardArrival {
    /// Seconds until the ball crosses the goal plane, capped at `max_horizon`
    pub time_to_goal: f32,
    /// Extrapolated ball position at that time (gravity applied to z)
    pub arrival_pos: Vec3,
}

/// Extrapolate the ball to the goal plane `team` attacks
///
/// Returns `None` when the velocity component toward that plane is ~zero:
/// there is no defined arrival time.
pub fn predict_goalward_arrival(
    ball: &PhysicsObject,
    team: Team,
    params: &ShotParams,
) -> Option<GoalwardArrival> {
    let sign = team.attack_sign();
    let v_toward = ball.vel.y * sign;
    if v_toward < 1.0 {
        return None;
    }

    let distance = (goal::PLANE_Y - ball.pos.y * sign).max(0.0);
    let t = (distance / v_toward).min(params.max_horizon);

    let mut arrival = ball.pos + ball.vel * t;
    arrival.z += 0.5 * arena::GRAVITY_Z * t * t;

    Some(GoalwardArrival { time_to_goal: t, arrival_pos: arrival })
}

/// Whether the predicted arrival lands inside the goal mouth
fn on_frame(arrival: &GoalwardArrival, params: &ShotParams) -> bool {
    let pos = arrival.arrival_pos;
    pos.z <= goal::HEIGHT + params.height_margin
        && pos.z >= params.min_arrival_height
        && pos.x.abs() <= goal::HALF_WIDTH + params.lateral_margin
}

/// Aim point used for alignment checks: goal center at half opening height
fn goal_aim_point(team: Team) -> Vec3 {
    let mut center = team.attacking_goal_center();
    center.z = goal::HEIGHT * 0.5;
    center
}

// ============================================================================
// Guaranteed-shot classifier
// ============================================================================

/// Conservatively estimate whether `defender` reaches the arrival point in
/// time to save
fn can_intercept(
    defender_pos: Vec3,
    defender_vel_norm: f32,
    ball_pos: Vec3,
    arrival: &GoalwardArrival,
    team: Team,
    params: &ShotParams,
) -> bool {
    let goal_center = team.attacking_goal_center();
    if (defender_pos - goal_center).norm() > params.defender_radius {
        return false;
    }
    // Only defenders between ball and goal can cut the shot off
    if alignment(defender_pos - ball_pos, goal_center - ball_pos) <= 0.0 {
        return false;
    }

    let mut effective_speed = (car::MAX_SPEED * params.defender_speed_frac).max(defender_vel_norm);
    if arrival.arrival_pos.z > params.aerial_save_height {
        effective_speed *= params.aerial_save_penalty;
    }

    let intercept_dist = (arrival.arrival_pos - defender_pos).norm();
    let intercept_time = intercept_dist / effective_speed + params.reaction_time;
    intercept_time <= arrival.time_to_goal + params.intercept_buffer
}

/// Classify the current ball trajectory as a guaranteed (unsaveable) shot
/// for `team`
///
/// All gates must pass: defined arrival inside the reliable horizon,
/// minimum ball speed, on-frame arrival under gravity, tight velocity
/// alignment with the goal center, and no opponent with a plausible
/// intercept. Any failure classifies the shot as saveable.
pub fn is_guaranteed_shot(state: &GameState, team: Team, params: &ShotParams) -> bool {
    let arrival = match predict_goalward_arrival(&state.ball, team, params) {
        Some(a) => a,
        None => return false,
    };

    if arrival.time_to_goal > params.reliable_horizon {
        return false;
    }
    if state.ball.vel.norm() < params.min_ball_speed {
        return false;
    }
    if !on_frame(&arrival, params) {
        return false;
    }
    if alignment(state.ball.vel, goal_aim_point(team) - state.ball.pos) < params.min_alignment {
        return false;
    }

    let saveable = state
        .players
        .iter()
        .filter(|p| p.team != team)
        .any(|p| can_intercept(p.pos, p.vel.norm(), state.ball.pos, &arrival, team, params));

    !saveable
}

/// Continuous shot quality in [0, 1] for the non-binary reward variants
///
/// Product of four documented factors: goal alignment mapped over
/// [0.3, 1.0], ball speed mapped over [half the minimum shot speed, half
/// the ball speed cap], an on-frame factor (1 inside the mouth, decaying
/// with miss distance), and a horizon factor (1 inside the reliable
/// horizon, decaying to 0 at the cap). Opponents are ignored here; the
/// binary classifier is the only opponent-aware gate.
pub fn shot_quality(state: &GameState, team: Team, params: &ShotParams) -> f32 {
    let arrival = match predict_goalward_arrival(&state.ball, team, params) {
        Some(a) => a,
        None => return 0.0,
    };

    let align = alignment(state.ball.vel, goal_aim_point(team) - state.ball.pos);
    let align_score = unit_range(align, 0.3, 1.0);

    let speed_score = unit_range(
        state.ball.vel.norm(),
        params.min_ball_speed * 0.5,
        ball::MAX_SPEED * 0.5,
    );

    let frame_score = if on_frame(&arrival, params) {
        1.0
    } else {
        let lateral_miss =
            (arrival.arrival_pos.x.abs() - goal::HALF_WIDTH).max(0.0);
        let height_miss = (arrival.arrival_pos.z - goal::HEIGHT).max(0.0)
            + (params.min_arrival_height - arrival.arrival_pos.z).max(0.0);
        1.0 - unit_range(lateral_miss + height_miss, 0.0, goal::HALF_WIDTH)
    };

    let horizon_score = 1.0
        - unit_range(
            arrival.time_to_goal,
            params.reliable_horizon,
            params.max_horizon,
        );

    (align_score * speed_score * frame_score * horizon_score).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::state_1v1;
    use proptest::prelude::*;

    /// Ball 2000 uu out from the orange goal, shot dead center at high speed
    fn open_net_shot() -> GameState {
        let mut state = state_1v1();
        state.ball.pos = Vec3::new(0.0, goal::PLANE_Y - 2000.0, 200.0);
        // Aimed slightly upward at the goal mouth so gravity keeps it on frame
        state.ball.vel = Vec3::new(0.0, 2800.0, 250.0);
        // Keep both cars far from the orange goal
        state.players[0].pos = Vec3::new(0.0, -3000.0, 17.0);
        state.players[1].pos = Vec3::new(0.0, -4000.0, 17.0);
        state
    }

    #[test]
    fn test_arrival_prediction_applies_gravity() {
        let state = open_net_shot();
        let arrival =
            predict_goalward_arrival(&state.ball, Team::Blue, &ShotParams::default()).unwrap();

        let expected_t = 2000.0 / 2800.0;
        assert!((arrival.time_to_goal - expected_t).abs() < 1e-3);

        let ballistic_z =
            200.0 + 250.0 * expected_t + 0.5 * arena::GRAVITY_Z * expected_t * expected_t;
        assert!((arrival.arrival_pos.z - ballistic_z).abs() < 1e-2);
        assert!(arrival.arrival_pos.z < 200.0 + 250.0 * expected_t);
    }

    #[test]
    fn test_no_arrival_without_goalward_velocity() {
        let mut state = state_1v1();
        state.ball.vel = Vec3::new(1500.0, 0.0, 0.0);
        assert!(predict_goalward_arrival(&state.ball, Team::Blue, &ShotParams::default()).is_none());

        state.ball.vel = Vec3::zeros();
        assert!(predict_goalward_arrival(&state.ball, Team::Blue, &ShotParams::default()).is_none());
    }

    #[test]
    fn test_open_net_shot_is_guaranteed() {
        let state = open_net_shot();
        assert!(is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_defender_on_line_blocks_guarantee() {
        let mut state = open_net_shot();
        // Orange defender parked on the goal line between ball and goal
        state.players[1].pos = Vec3::new(0.0, goal::PLANE_Y - 100.0, 17.0);
        assert!(!is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_defender_behind_ball_does_not_block() {
        let mut state = open_net_shot();
        // Defender close to the goal radius but behind the ball
        state.players[1].pos = Vec3::new(0.0, goal::PLANE_Y - 6000.0, 17.0);
        assert!(is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_slow_ball_is_never_guaranteed() {
        let mut state = open_net_shot();
        state.ball.pos = Vec3::new(0.0, goal::PLANE_Y - 500.0, 200.0);
        state.ball.vel = Vec3::new(0.0, 600.0, 50.0);
        assert!(!is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_crossbar_overshoot_rejected() {
        let mut state = open_net_shot();
        state.ball.vel = Vec3::new(0.0, 2800.0, 2000.0);
        assert!(!is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_wide_shot_rejected() {
        let mut state = open_net_shot();
        state.ball.vel = Vec3::new(2000.0, 2800.0, 250.0);
        assert!(!is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_distant_shot_beyond_horizon_rejected() {
        let mut state = open_net_shot();
        state.ball.pos = Vec3::new(0.0, -4000.0, 200.0);
        state.ball.vel = Vec3::new(0.0, 1100.0, 100.0);
        assert!(!is_guaranteed_shot(&state, Team::Blue, &ShotParams::default()));
    }

    #[test]
    fn test_quality_of_open_net_shot() {
        let state = open_net_shot();
        let q = shot_quality(&state, Team::Blue, &ShotParams::default());
        assert!(q > 0.3, "quality {q} too low for a clean shot");
        assert!(q <= 1.0);
    }

    #[test]
    fn test_quality_zero_at_kickoff() {
        let state = state_1v1();
        assert_eq!(shot_quality(&state, Team::Blue, &ShotParams::default()), 0.0);
        assert_eq!(shot_quality(&state, Team::Orange, &ShotParams::default()), 0.0);
    }

    proptest! {
        #[test]
        fn prop_quality_is_finite_and_bounded(
            px in -4000.0f32..4000.0, py in -5000.0f32..5000.0, pz in 0.0f32..2000.0,
            vx in -6000.0f32..6000.0, vy in -6000.0f32..6000.0, vz in -6000.0f32..6000.0,
        ) {
            let mut state = state_1v1();
            state.ball.pos = Vec3::new(px, py, pz);
            state.ball.vel = Vec3::new(vx, vy, vz);

            for team in [Team::Blue, Team::Orange] {
                let q = shot_quality(&state, team, &ShotParams::default());
                prop_assert!(q.is_finite());
                prop_assert!((0.0..=1.0).contains(&q));
            }
        }
    }
}
