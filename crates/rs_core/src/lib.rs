//! # rs_core - Deterministic Reward Shaping Engine
//!
//! Event detection and sequence scoring for Rocket League-style RL
//! training. The simulator hands in one immutable state snapshot per tick;
//! this library demodulates discrete events out of the continuous physics
//! signals, tracks multi-tick patterns per agent, and returns one shaped
//! scalar per agent per tick.
//!
//! ## Features
//! - 100% deterministic evaluation (same snapshots = same rewards)
//! - Stateless detectors, per-agent sequence trackers, closed-form
//!   trajectory prediction
//! - Declarative JSON reward-set configuration
//! - One engine per environment, `Send + Sync` components throughout

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod metrics;
pub mod physics_constants;
pub mod rewards;
pub mod state;
pub mod trackers;
pub mod trajectory;

#[cfg(test)]
pub mod test_fixtures;

pub use config::{ComponentEntry, ComponentKind, RewardConfig};
pub use engine::ShapingEngine;
pub use error::{ConfigError, Result};
pub use metrics::{EpisodeMetrics, Report, TerminationReason};
pub use rewards::{RewardFunction, WeightedRewards};
pub use state::{Controls, GameState, PhysicsObject, Player, Step, Team};
