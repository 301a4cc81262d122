//! Core Siege - a core-defense simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, waves, game session)
//! - `renderer`: Read-only frame snapshots and the `Renderer` seam
//! - `platform`: Input sources that feed discrete commands into the session
//! - `settings`: Data-driven session configuration

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Default play area dimensions (pixels)
    pub const ARENA_WIDTH: f64 = 800.0;
    pub const ARENA_HEIGHT: f64 = 600.0;

    /// Monsters within this distance of the core breach it
    pub const CORE_BREACH_RADIUS: f64 = 20.0;

    /// Placement rules
    pub const MIN_PLACEMENT_DISTANCE_FROM_CORE: f64 = 50.0;
    pub const MIN_PLACEMENT_DISTANCE_BETWEEN_UNITS: f64 = 25.0;
    pub const PLACEMENT_MARGIN: f64 = 20.0;

    /// Monsters spawn this far outside the play bounds
    pub const SPAWN_OFFSET: f64 = 20.0;

    /// Melee contact pushes monsters back along the unit->monster vector
    pub const MELEE_KNOCKBACK: f64 = 10.0;

    /// Projectile defaults
    pub const PROJECTILE_LIFETIME_MS: f64 = 2000.0;
    pub const PROJECTILE_SIZE: f64 = 3.0;
    pub const MAGIC_PROJECTILE_SIZE: f64 = 5.0;
    pub const MAGIC_SPLASH_RADIUS: f64 = 30.0;

    /// Splash damage at the edge of the radius (fraction of full damage)
    pub const SPLASH_EDGE_FRACTION: f64 = 0.5;

    /// Wave timing
    pub const WAVE_DURATION_MS: f64 = 30_000.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Unit vector at the given angle (radians)
#[inline]
pub fn direction(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}

/// Angle (radians) of the vector pointing from `from` to `to`
#[inline]
pub fn angle_between(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}
