//! Physics constants for the soccar arena
//!
//! All distances are in arena units (uu), speeds in uu/s, following the
//! simulator's native coordinate system: x is the side axis, y the
//! goal-to-goal axis, z up. The orange goal sits on the +y back wall and
//! the blue goal on the -y back wall.

// ============================================================
// Arena boundary planes
// ============================================================
pub mod arena {
    /// Side wall distance from center (|x| of both side walls)
    pub const SIDE_WALL_X: f32 = 4096.0;

    /// Back wall distance from center (|y| of both back walls)
    pub const BACK_WALL_Y: f32 = 5120.0;

    /// Ceiling height
    pub const CEILING_Z: f32 = 2044.0;

    /// Gravity acceleration along z (uu/s²)
    pub const GRAVITY_Z: f32 = -650.0;
}

// ============================================================
// Goal opening
// ============================================================
pub mod goal {
    /// Height of the goal opening (crossbar underside)
    pub const HEIGHT: f32 = 642.775;

    /// Half the width of the goal opening (post to center)
    pub const HALF_WIDTH: f32 = 892.755;

    /// |y| of both goal planes (the back walls)
    pub const PLANE_Y: f32 = super::arena::BACK_WALL_Y;
}

// ============================================================
// Car limits
// ============================================================
pub mod car {
    /// Maximum achievable car speed (boosting)
    pub const MAX_SPEED: f32 = 2300.0;

    /// Speed at which a car becomes supersonic
    pub const SUPERSONIC_THRESHOLD: f32 = 2200.0;

    /// Maximum car angular velocity (rad/s)
    pub const MAX_ANG_VEL: f32 = 5.5;

    /// Maximum boost amount
    pub const MAX_BOOST: f32 = 100.0;
}

// ============================================================
// Ball limits
// ============================================================
pub mod ball {
    /// Ball collision radius
    pub const RADIUS: f32 = 92.75;

    /// Maximum ball speed
    pub const MAX_SPEED: f32 = 6000.0;
}

// ============================================================
// Boost pads
// ============================================================
pub mod boost {
    /// Number of boost pads on a standard field
    pub const PAD_COUNT: usize = 34;

    /// Boost granted by a big pad
    pub const BIG_PAD_AMOUNT: f32 = 100.0;

    /// Boost granted by a small pad
    pub const SMALL_PAD_AMOUNT: f32 = 12.0;

    /// Big pads sit slightly higher than small pads; z above this marks a big pad
    pub const BIG_PAD_Z_THRESHOLD: f32 = 72.0;

    /// Fixed pad positions (x, y, z), index-aligned with `GameState::boost_pads`
    pub const PAD_LOCATIONS: [(f32, f32, f32); PAD_COUNT] = [
        (0.0, -4240.0, 70.0),
        (-1792.0, -4184.0, 70.0),
        (1792.0, -4184.0, 70.0),
        (-3072.0, -4096.0, 73.0),
        (3072.0, -4096.0, 73.0),
        (-940.0, -3308.0, 70.0),
        (940.0, -3308.0, 70.0),
        (0.0, -2816.0, 70.0),
        (-3584.0, -2484.0, 70.0),
        (3584.0, -2484.0, 70.0),
        (-1788.0, -2300.0, 70.0),
        (1788.0, -2300.0, 70.0),
        (-2048.0, -1036.0, 70.0),
        (0.0, -1024.0, 70.0),
        (2048.0, -1036.0, 70.0),
        (-3584.0, 0.0, 73.0),
        (-1024.0, 0.0, 70.0),
        (1024.0, 0.0, 70.0),
        (3584.0, 0.0, 73.0),
        (-2048.0, 1036.0, 70.0),
        (0.0, 1024.0, 70.0),
        (2048.0, 1036.0, 70.0),
        (-1788.0, 2300.0, 70.0),
        (1788.0, 2300.0, 70.0),
        (-3584.0, 2484.0, 70.0),
        (3584.0, 2484.0, 70.0),
        (0.0, 2816.0, 70.0),
        (-940.0, 3308.0, 70.0),
        (940.0, 3308.0, 70.0),
        (-3072.0, 4096.0, 73.0),
        (3072.0, 4096.0, 73.0),
        (-1792.0, 4184.0, 70.0),
        (1792.0, 4184.0, 70.0),
        (0.0, 4240.0, 70.0),
    ];
}
