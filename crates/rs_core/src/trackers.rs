//! Per-agent sequence tracking primitives
//!
//! Small state machines keyed by car id that turn detector outputs into
//! multi-tick patterns: touch windows, sustained aerial carries, kickoff
//! phases, cooldowns. Reward components own one tracker instance per
//! concern; all state is allocated for the known roster at episode reset
//! and never grows past it.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::events::WallBounce;
use crate::math::Vec3;
use crate::state::Player;

// ============================================================================
// AgentMap
// ============================================================================

/// Contract-violation hook: an agent id showed up that was not in the
/// roster at reset. With `strict_contracts` this panics (CI builds);
/// otherwise it logs and the caller degrades the tick to a zero score.
pub(crate) fn missing_agent(car_id: u32, owner: &str) {
    #[cfg(feature = "strict_contracts")]
    panic!("unknown car id {car_id} in {owner}; was reset_episode called?");
    #[cfg(not(feature = "strict_contracts"))]
    log::warn!("unknown car id {car_id} in {owner}; was reset_episode called?");
}

/// Per-agent tracker state, keyed by stable car id
///
/// Uses a version-stable hasher so nothing about iteration or growth can
/// perturb determinism; keys are only ever inserted at reset time, from
/// the roster of the initial state.
#[derive(Debug, Clone)]
pub struct AgentMap<T> {
    inner: FxHashMap<u32, T>,
}

impl<T> Default for AgentMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AgentMap<T> {
    pub fn new() -> Self {
        Self { inner: FxHashMap::default() }
    }

    /// Discard all state and allocate one entry per roster member
    pub fn reset_with<F: FnMut(&Player) -> T>(&mut self, roster: &[Player], mut init: F) {
        self.inner.clear();
        for player in roster {
            self.inner.insert(player.car_id, init(player));
        }
    }

    /// Discard all state and allocate default entries for the roster
    pub fn reset(&mut self, roster: &[Player])
    where
        T: Default,
    {
        self.reset_with(roster, |_| T::default());
    }

    /// State for a roster member; `None` (after the contract hook fires)
    /// for an id outside the reset-time roster
    pub fn get_mut(&mut self, car_id: u32, owner: &str) -> Option<&mut T> {
        if !self.inner.contains_key(&car_id) {
            missing_agent(car_id, owner);
            return None;
        }
        self.inner.get_mut(&car_id)
    }

    pub fn get(&self, car_id: u32) -> Option<&T> {
        self.inner.get(&car_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ============================================================================
// Cooldown
// ============================================================================

/// Elapsed-time gate that re-arms `period` seconds after each fire
///
/// Fresh cooldowns are armed immediately (the first event is never
/// suppressed).
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    clock: f32,
    last_fire: f32,
    period: f32,
}

impl Cooldown {
    pub fn new(period: f32) -> Self {
        Self { clock: 0.0, last_fire: -period, period }
    }

    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;
    }

    pub fn ready(&self) -> bool {
        self.clock - self.last_fire >= self.period
    }

    pub fn fire(&mut self) {
        self.last_fire = self.clock;
    }
}

// ============================================================================
// AirTime
// ============================================================================

/// Accumulates time spent airborne; reports the total on the landing tick
///
/// Lets callers reject micro-hops by requiring a minimum airtime before a
/// landing counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AirTime {
    in_air: bool,
    seconds: f32,
}

impl AirTime {
    pub fn starting(on_ground: bool) -> Self {
        Self { in_air: !on_ground, seconds: 0.0 }
    }

    /// Advance one tick; returns `Some(total airborne seconds)` on the
    /// tick the player lands, `None` otherwise
    pub fn update(&mut self, on_ground: bool, dt: f32) -> Option<f32> {
        if !on_ground {
            self.in_air = true;
            self.seconds += dt;
            return None;
        }
        if self.in_air {
            self.in_air = false;
            let total = self.seconds;
            self.seconds = 0.0;
            return Some(total);
        }
        None
    }

    pub fn airborne_for(&self) -> f32 {
        self.seconds
    }
}

// ============================================================================
// Double-touch window
// ============================================================================

/// Timing window for the two-touches family
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TouchWindow {
    /// A second touch earlier than this is a continuation, not a double
    pub min_gap: f32,
    /// A second touch later than this no longer counts
    pub max_gap: f32,
}

impl Default for TouchWindow {
    fn default() -> Self {
        Self { min_gap: 0.1, max_gap: 3.0 }
    }
}

/// A completed double touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedDouble {
    /// Seconds between the two touches
    pub gap: f32,
    /// Wall bounce observed between the touches, if any (never `Ceiling`)
    pub wall: Option<WallBounce>,
}

#[derive(Debug, Clone, Copy, Default)]
enum TouchPhase {
    #[default]
    Idle,
    AwaitingSecond {
        elapsed: f32,
        wall: Option<WallBounce>,
    },
}

/// `Idle -> AwaitingSecond -> scored | timeout` machine for one agent
///
/// The wall flag is orthogonal: a bounce between the touches is recorded
/// and handed to the scoring function, which consults it for multipliers
/// but does not require it. A ceiling bounce kills the sequence outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleTouchTracker {
    phase: TouchPhase,
}

impl DoubleTouchTracker {
    /// Advance one tick. `touched` is the simulator's per-tick contact
    /// flag for this agent; `bounce` is this tick's wall classification.
    ///
    /// A touch faster than `min_gap` restarts the window (it supersedes
    /// the previous first touch); a touch after `max_gap` finds the
    /// tracker already idle and likewise starts a fresh window.
    pub fn observe(
        &mut self,
        touched: bool,
        bounce: Option<WallBounce>,
        dt: f32,
        window: &TouchWindow,
    ) -> Option<CompletedDouble> {
        if let TouchPhase::AwaitingSecond { elapsed, wall } = &mut self.phase {
            *elapsed += dt;

            match bounce {
                Some(WallBounce::Ceiling) => {
                    self.phase = TouchPhase::Idle;
                }
                Some(b) => *wall = Some(b),
                None => {}
            }

            if let TouchPhase::AwaitingSecond { elapsed, .. } = &self.phase {
                if *elapsed > window.max_gap {
                    self.phase = TouchPhase::Idle;
                }
            }
        }

        if !touched {
            return None;
        }

        match self.phase {
            TouchPhase::Idle => {
                self.phase = TouchPhase::AwaitingSecond { elapsed: 0.0, wall: None };
                None
            }
            TouchPhase::AwaitingSecond { elapsed, wall } => {
                if elapsed >= window.min_gap {
                    self.phase = TouchPhase::Idle;
                    Some(CompletedDouble { gap: elapsed, wall })
                } else {
                    // Too fast: treat as a fresh first touch
                    self.phase = TouchPhase::AwaitingSecond { elapsed: 0.0, wall: None };
                    None
                }
            }
        }
    }

    pub fn awaiting_second(&self) -> bool {
        matches!(self.phase, TouchPhase::AwaitingSecond { .. })
    }
}

// ============================================================================
// Aerial carry
// ============================================================================

/// Thresholds shared by the whole aerial-carry family
///
/// One canonical set; the original's copy-pasted variants drifted apart
/// and are deliberately collapsed here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarryParams {
    /// Boosting within this window still counts (feathering)
    pub feather_grace: f32,
    /// Minimum ball-velocity alignment with the attacked goal
    pub min_alignment: f32,
    /// Progress decay time constant while conditions lapse (seconds)
    pub decay_tau: f32,
    /// Remaining progress below this fully resets the carry
    pub drop_threshold: f32,
}

impl Default for CarryParams {
    fn default() -> Self {
        Self {
            feather_grace: 0.3,
            min_alignment: 0.3,
            decay_tau: 0.5,
            drop_threshold: 0.01,
        }
    }
}

/// Sustained aerial-carry state for one agent
///
/// Continuation accumulates control time and peak ball height; brief
/// condition gaps decay accumulated control exponentially instead of
/// hard-resetting, so a one-tick flicker does not erase credit but a
/// sustained loss does.
#[derive(Debug, Clone, Copy)]
pub struct CarryTracker {
    active: bool,
    control_time: f32,
    peak_ball_height: f32,
    touch_count: u32,
    start_pos: Vec3,
    /// Seconds since boost was last applied; `None` = never this episode
    boost_age: Option<f32>,
}

impl Default for CarryTracker {
    fn default() -> Self {
        Self {
            active: false,
            control_time: 0.0,
            peak_ball_height: 0.0,
            touch_count: 0,
            start_pos: Vec3::zeros(),
            boost_age: None,
        }
    }
}

impl CarryTracker {
    /// Record this tick's boost input before evaluating carry conditions
    pub fn note_boost(&mut self, boosting_now: bool, dt: f32) {
        if boosting_now {
            self.boost_age = Some(0.0);
        } else if let Some(age) = &mut self.boost_age {
            *age += dt;
        }
    }

    /// True if boost was applied now or within the feather grace window
    pub fn boosting_within_grace(&self, params: &CarryParams) -> bool {
        matches!(self.boost_age, Some(age) if age < params.feather_grace)
    }

    /// Advance one tick; returns whether the carry is active afterwards
    pub fn update(
        &mut self,
        conditions_met: bool,
        touched: bool,
        ball_height: f32,
        player_pos: Vec3,
        dt: f32,
        params: &CarryParams,
    ) -> bool {
        if conditions_met {
            if !self.active {
                self.active = true;
                if self.control_time <= 0.0 {
                    self.peak_ball_height = ball_height;
                    self.touch_count = 0;
                    self.start_pos = player_pos;
                }
            }
            self.control_time += dt;
            self.peak_ball_height = self.peak_ball_height.max(ball_height);
            if touched {
                self.touch_count += 1;
            }
        } else if self.active || self.control_time > 0.0 {
            self.active = false;
            self.control_time *= (-dt / params.decay_tau).exp();
            if self.control_time < params.drop_threshold {
                let boost_age = self.boost_age;
                *self = Self::default();
                self.boost_age = boost_age;
            }
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn control_time(&self) -> f32 {
        self.control_time
    }

    pub fn peak_ball_height(&self) -> f32 {
        self.peak_ball_height
    }

    pub fn touch_count(&self) -> u32 {
        self.touch_count
    }

    pub fn start_pos(&self) -> Vec3 {
        self.start_pos
    }
}

// ============================================================================
// Kickoff phase
// ============================================================================

/// Timing bounds for the kickoff phase machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KickoffPhaseParams {
    /// Kickoff phase ends after this many seconds regardless
    pub max_kickoff_time: f32,
    /// Ball speed that ends the kickoff phase
    pub end_ball_speed: f32,
    /// First-touch attribution keeps arming concede punishment this long
    pub concede_window: f32,
}

impl Default for KickoffPhaseParams {
    fn default() -> Self {
        Self { max_kickoff_time: 5.0, end_ball_speed: 500.0, concede_window: 8.0 }
    }
}

/// Kickoff phase state for one agent
///
/// Tracks the active kickoff window plus a longer tail used to attribute
/// an early concede back to whoever took the first touch.
#[derive(Debug, Clone, Copy, Default)]
pub struct KickoffTracker {
    in_kickoff: bool,
    tracking: bool,
    elapsed: f32,
    got_first_touch: bool,
    first_touch_rewarded: bool,
}

impl KickoffTracker {
    /// Advance one tick given the kickoff-pending detector output
    pub fn update(&mut self, pending: bool, ball_speed: f32, dt: f32, params: &KickoffPhaseParams) {
        if pending {
            if !self.in_kickoff {
                self.in_kickoff = true;
                self.tracking = true;
                self.got_first_touch = false;
                self.first_touch_rewarded = false;
            }
            // The clock starts when the ball is first moved off the spot
            self.elapsed = 0.0;
        }

        if self.tracking {
            self.elapsed += dt;
            if self.elapsed > params.concede_window {
                self.tracking = false;
                self.got_first_touch = false;
                self.first_touch_rewarded = false;
            }
        }

        if self.in_kickoff
            && (self.elapsed > params.max_kickoff_time || ball_speed > params.end_ball_speed)
        {
            self.in_kickoff = false;
            // Keep tracking for the concede window
        }
    }

    /// Record a touch; returns true exactly once per kickoff, on the
    /// first touch inside the kickoff phase
    pub fn note_touch(&mut self) -> bool {
        if self.in_kickoff && !self.first_touch_rewarded {
            self.got_first_touch = true;
            self.first_touch_rewarded = true;
            return true;
        }
        false
    }

    /// True when a concede right now should be pinned on this agent
    pub fn concede_armed(&self, params: &KickoffPhaseParams) -> bool {
        self.tracking && self.got_first_touch && self.elapsed <= params.concede_window
    }

    /// Disarm after the punishment has been applied
    pub fn disarm(&mut self) {
        self.tracking = false;
    }

    pub fn in_kickoff(&self) -> bool {
        self.in_kickoff
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
