//! Declarative reward-set configuration
//!
//! A [`RewardConfig`] is a serde-friendly description of a weighted reward
//! set: one entry per component, each with a weight and optional
//! parameter overrides. `build` turns it into a live [`WeightedRewards`].
//! Training runs keep these as JSON next to their hyperparameters so a
//! reward set is reproducible from the run directory alone.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::rewards::aerial_carry::{
    AerialCarryParams, AerialCarryReward, CarryGoalParams, CarryGoalReward, CarrySetupParams,
    CarrySetupReward, CarryStartParams, CarryStartReward,
};
use crate::rewards::basic::{
    AirReward, FaceBallReward, GoalReward, OwnGoalPunishment, SaveBoostReward, StrongTouchParams,
    StrongTouchReward, TouchAccelReward, VelocityPlayerToBallReward,
};
use crate::rewards::boost::{
    BigBoostReward, BoostEfficiencyReward, BoostPadProximityReward, LandOnBoostParams,
    LandOnBoostReward, PadProximityParams, PickupBoostReward,
};
use crate::rewards::double_touch::{
    CarryTrajectoryParams, CarryTrajectoryReward, DoubleTouchParams, DoubleTouchReward,
    SetupTouchParams, SetupTouchReward,
};
use crate::rewards::kickoff::{
    KickoffFirstTouchReward, KickoffSpeedParams, KickoffSpeedReward, KickoffTouchParams,
};
use crate::rewards::mechanics::{
    DirectionalFlipParams, DirectionalFlipReward, FastAerialParams, FastAerialReward,
    HalfFlipParams, HalfFlipReward, PowerslideParams, PowerslideReward, RecoveryParams,
    RecoveryLandingReward, WavedashParams, WavedashReward,
};
use crate::rewards::shot::{
    GuaranteedShotParams, GuaranteedShotReward, ShotQualityReward,
};
use crate::rewards::{RewardFunction, WeightedRewards};
use crate::trajectory::ShotParams;

// ============================================================================
// Config types
// ============================================================================

/// One component in a reward set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub weight: f32,
    #[serde(flatten)]
    pub component: ComponentKind,
}

/// Every available component, with optional parameter overrides
///
/// Parameter fields default to the canonical thresholds when omitted from
/// the config, so a minimal entry is just `{"kind": "air", "weight": 0.1}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentKind {
    Air,
    FaceBall,
    VelocityToBall,
    StrongTouch {
        #[serde(default)]
        params: StrongTouchParams,
    },
    TouchAccel,
    SaveBoost,
    Goal,
    OwnGoal,
    PickupBoost,
    BigBoost,
    BoostEfficiency,
    BoostPadProximity {
        #[serde(default)]
        params: PadProximityParams,
    },
    LandOnBoost {
        #[serde(default)]
        params: LandOnBoostParams,
    },
    ShotQuality {
        #[serde(default)]
        params: ShotParams,
    },
    GuaranteedShot {
        #[serde(default)]
        params: GuaranteedShotParams,
    },
    DoubleTouch {
        #[serde(default)]
        params: DoubleTouchParams,
    },
    SetupTouch {
        #[serde(default)]
        params: SetupTouchParams,
    },
    CarryTrajectory {
        #[serde(default)]
        params: CarryTrajectoryParams,
    },
    AerialCarry {
        #[serde(default)]
        params: AerialCarryParams,
    },
    CarrySetup {
        #[serde(default)]
        params: CarrySetupParams,
    },
    CarryStart {
        #[serde(default)]
        params: CarryStartParams,
    },
    CarryGoal {
        #[serde(default)]
        params: CarryGoalParams,
    },
    KickoffSpeed {
        #[serde(default)]
        params: KickoffSpeedParams,
    },
    KickoffFirstTouch {
        #[serde(default)]
        params: KickoffTouchParams,
    },
    Powerslide {
        #[serde(default)]
        params: PowerslideParams,
    },
    HalfFlip {
        #[serde(default)]
        params: HalfFlipParams,
    },
    Wavedash {
        #[serde(default)]
        params: WavedashParams,
    },
    DirectionalFlip {
        #[serde(default)]
        params: DirectionalFlipParams,
    },
    FastAerial {
        #[serde(default)]
        params: FastAerialParams,
    },
    RecoveryLanding {
        #[serde(default)]
        params: RecoveryParams,
    },
}

impl ComponentKind {
    fn instantiate(&self) -> Box<dyn RewardFunction> {
        match self.clone() {
            ComponentKind::Air => Box::new(AirReward),
            ComponentKind::FaceBall => Box::new(FaceBallReward),
            ComponentKind::VelocityToBall => Box::new(VelocityPlayerToBallReward),
            ComponentKind::StrongTouch { params } => Box::new(StrongTouchReward { params }),
            ComponentKind::TouchAccel => Box::new(TouchAccelReward),
            ComponentKind::SaveBoost => Box::new(SaveBoostReward),
            ComponentKind::Goal => Box::new(GoalReward),
            ComponentKind::OwnGoal => Box::new(OwnGoalPunishment),
            ComponentKind::PickupBoost => Box::new(PickupBoostReward),
            ComponentKind::BigBoost => Box::new(BigBoostReward),
            ComponentKind::BoostEfficiency => Box::new(BoostEfficiencyReward),
            ComponentKind::BoostPadProximity { params } => {
                Box::new(BoostPadProximityReward { params })
            }
            ComponentKind::LandOnBoost { params } => Box::new(LandOnBoostReward::new(params)),
            ComponentKind::ShotQuality { params } => Box::new(ShotQualityReward { params }),
            ComponentKind::GuaranteedShot { params } => {
                Box::new(GuaranteedShotReward::new(params))
            }
            ComponentKind::DoubleTouch { params } => Box::new(DoubleTouchReward::new(params)),
            ComponentKind::SetupTouch { params } => Box::new(SetupTouchReward { params }),
            ComponentKind::CarryTrajectory { params } => {
                Box::new(CarryTrajectoryReward::new(params))
            }
            ComponentKind::AerialCarry { params } => Box::new(AerialCarryReward::new(params)),
            ComponentKind::CarrySetup { params } => Box::new(CarrySetupReward::new(params)),
            ComponentKind::CarryStart { params } => Box::new(CarryStartReward::new(params)),
            ComponentKind::CarryGoal { params } => Box::new(CarryGoalReward::new(params)),
            ComponentKind::KickoffSpeed { params } => Box::new(KickoffSpeedReward::new(params)),
            ComponentKind::KickoffFirstTouch { params } => {
                Box::new(KickoffFirstTouchReward::new(params))
            }
            ComponentKind::Powerslide { params } => Box::new(PowerslideReward { params }),
            ComponentKind::HalfFlip { params } => Box::new(HalfFlipReward::new(params)),
            ComponentKind::Wavedash { params } => Box::new(WavedashReward::new(params)),
            ComponentKind::DirectionalFlip { params } => {
                Box::new(DirectionalFlipReward::new(params))
            }
            ComponentKind::FastAerial { params } => Box::new(FastAerialReward::new(params)),
            ComponentKind::RecoveryLanding { params } => {
                Box::new(RecoveryLandingReward::new(params))
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ComponentKind::Air => "air",
            ComponentKind::FaceBall => "face_ball",
            ComponentKind::VelocityToBall => "velocity_to_ball",
            ComponentKind::StrongTouch { .. } => "strong_touch",
            ComponentKind::TouchAccel => "touch_accel",
            ComponentKind::SaveBoost => "save_boost",
            ComponentKind::Goal => "goal",
            ComponentKind::OwnGoal => "own_goal",
            ComponentKind::PickupBoost => "pickup_boost",
            ComponentKind::BigBoost => "big_boost",
            ComponentKind::BoostEfficiency => "boost_efficiency",
            ComponentKind::BoostPadProximity { .. } => "boost_pad_proximity",
            ComponentKind::LandOnBoost { .. } => "land_on_boost",
            ComponentKind::ShotQuality { .. } => "shot_quality",
            ComponentKind::GuaranteedShot { .. } => "guaranteed_shot",
            ComponentKind::DoubleTouch { .. } => "double_touch",
            ComponentKind::SetupTouch { .. } => "setup_touch",
            ComponentKind::CarryTrajectory { .. } => "carry_trajectory",
            ComponentKind::AerialCarry { .. } => "aerial_carry",
            ComponentKind::CarrySetup { .. } => "carry_setup",
            ComponentKind::CarryStart { .. } => "carry_start",
            ComponentKind::CarryGoal { .. } => "carry_goal",
            ComponentKind::KickoffSpeed { .. } => "kickoff_speed",
            ComponentKind::KickoffFirstTouch { .. } => "kickoff_first_touch",
            ComponentKind::Powerslide { .. } => "powerslide",
            ComponentKind::HalfFlip { .. } => "half_flip",
            ComponentKind::Wavedash { .. } => "wavedash",
            ComponentKind::DirectionalFlip { .. } => "directional_flip",
            ComponentKind::FastAerial { .. } => "fast_aerial",
            ComponentKind::RecoveryLanding { .. } => "recovery_landing",
        }
    }
}

/// Complete description of a reward set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    pub components: Vec<ComponentEntry>,
}

impl RewardConfig {
    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build the live reward set, in entry order
    pub fn build(&self) -> Result<WeightedRewards> {
        if self.components.is_empty() {
            return Err(ConfigError::EmptyRewardSet);
        }
        let mut rewards = WeightedRewards::new();
        for entry in &self.components {
            if !entry.weight.is_finite() {
                return Err(ConfigError::InvalidWeight {
                    kind: entry.component.kind_name().to_string(),
                    weight: entry.weight,
                });
            }
            rewards.add_mut(entry.component.instantiate(), entry.weight);
        }
        Ok(rewards)
    }

    /// The standard training mix: dense movement shaping, the sequence
    /// families at moderate weight, sparse goal terms on top
    pub fn standard() -> Self {
        let components = vec![
            ComponentEntry { weight: 0.05, component: ComponentKind::Air },
            ComponentEntry { weight: 0.05, component: ComponentKind::FaceBall },
            ComponentEntry { weight: 0.2, component: ComponentKind::VelocityToBall },
            ComponentEntry {
                weight: 1.0,
                component: ComponentKind::StrongTouch { params: StrongTouchParams::default() },
            },
            ComponentEntry { weight: 0.1, component: ComponentKind::SaveBoost },
            ComponentEntry { weight: 0.5, component: ComponentKind::PickupBoost },
            ComponentEntry {
                weight: 2.0,
                component: ComponentKind::ShotQuality { params: ShotParams::default() },
            },
            ComponentEntry {
                weight: 10.0,
                component: ComponentKind::GuaranteedShot {
                    params: GuaranteedShotParams::default(),
                },
            },
            ComponentEntry {
                weight: 4.0,
                component: ComponentKind::DoubleTouch { params: DoubleTouchParams::default() },
            },
            ComponentEntry {
                weight: 1.0,
                component: ComponentKind::AerialCarry { params: AerialCarryParams::default() },
            },
            ComponentEntry {
                weight: 1.0,
                component: ComponentKind::KickoffSpeed { params: KickoffSpeedParams::default() },
            },
            ComponentEntry { weight: 20.0, component: ComponentKind::Goal },
            ComponentEntry { weight: 30.0, component: ComponentKind::OwnGoal },
        ];
        Self { components }
    }
}
