//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Stable iteration order (spawn / placement order)
//! - No rendering or platform dependencies

pub mod combat;
pub mod command;
pub mod entity;
pub mod monster;
pub mod particle;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod unit;
pub mod upgrades;
pub mod wave;

pub use command::{Command, CommandError, PlacementError};
pub use entity::Vitals;
pub use monster::{Monster, MonsterKind, MonsterStats};
pub use particle::{Particle, ParticleField};
pub use projectile::{Element, Projectile, ProjectileKind};
pub use state::{EntityIds, GameEvent, GamePhase, GameSession, PlacementPending, SpeedMultiplier};
pub use tick::tick;
pub use unit::{EvolutionPath, Unit, UnitKind};
pub use upgrades::{UpgradeKind, UpgradeLevels, UpgradeSystem};
pub use wave::WaveDirector;
