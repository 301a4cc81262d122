//! Projectiles fired by ranged units
//!
//! A projectile flies in a straight line and dies on its first impact, after
//! `PROJECTILE_LIFETIME_MS`, or when it leaves the play bounds. What happens
//! on impact is decided by its `ProjectileKind` (see `combat`).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::direction;

/// Chain lightning jump defaults (Archmage)
pub const CHAIN_JUMPS: u32 = 3;
pub const CHAIN_RADIUS: f64 = 80.0;
/// Each jump deals this fraction of the previous hit
pub const CHAIN_FALLOFF: f64 = 0.7;

/// Elemental projectile tuning (Elementalist)
pub const FIRE_SPLASH_RADIUS: f64 = 40.0;
pub const FROST_SLOW_FACTOR: f64 = 0.5;
pub const FROST_SLOW_MS: f64 = 2000.0;
pub const STORM_JUMPS: u32 = 2;
pub const STORM_CHAIN_RADIUS: f64 = 70.0;

/// Element carried by an elemental projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Frost,
    Storm,
}

impl Element {
    /// Elements rotate in a fixed order, one per shot
    pub fn next(self) -> Self {
        match self {
            Element::Fire => Element::Frost,
            Element::Frost => Element::Storm,
            Element::Storm => Element::Fire,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            Element::Fire => 0xe67e22,
            Element::Frost => 0x81ecec,
            Element::Storm => 0x74b9ff,
        }
    }
}

/// Impact behavior of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Single-target hit
    Bolt,
    /// Area hit with linear falloff
    Magic { splash_radius: f64 },
    /// Single-target hit that arcs to nearby monsters
    ChainLightning { jumps: u32, chain_radius: f64 },
    /// Behavior depends on the element
    Elemental(Element),
}

impl ProjectileKind {
    pub fn magic() -> Self {
        ProjectileKind::Magic {
            splash_radius: MAGIC_SPLASH_RADIUS,
        }
    }

    pub fn chain_lightning() -> Self {
        ProjectileKind::ChainLightning {
            jumps: CHAIN_JUMPS,
            chain_radius: CHAIN_RADIUS,
        }
    }

    /// Splash radius if this projectile damages an area
    pub fn splash_radius(&self) -> Option<f64> {
        match *self {
            ProjectileKind::Magic { splash_radius } => Some(splash_radius),
            ProjectileKind::Elemental(Element::Fire) => Some(FIRE_SPLASH_RADIUS),
            _ => None,
        }
    }

    fn size(&self) -> f64 {
        match self {
            ProjectileKind::Bolt => PROJECTILE_SIZE,
            ProjectileKind::ChainLightning { .. } => 4.0,
            ProjectileKind::Magic { .. } | ProjectileKind::Elemental(_) => MAGIC_PROJECTILE_SIZE,
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: DVec2,
    pub vel: DVec2,
    pub damage: f64,
    pub size: f64,
    pub color: u32,
    pub kind: ProjectileKind,
    /// Rolled a critical hit (rendered with a distinct marker)
    pub critical: bool,
    pub age: f64,
    pub lifetime: f64,
    pub dead: bool,
}

impl Projectile {
    /// Launch from `origin` along `angle` (radians) at `speed` pixels/second
    pub fn fire(
        id: u32,
        origin: DVec2,
        angle: f64,
        speed: f64,
        damage: f64,
        color: u32,
        kind: ProjectileKind,
    ) -> Self {
        Self {
            id,
            pos: origin,
            vel: direction(angle) * speed,
            damage,
            size: kind.size(),
            color,
            kind,
            critical: false,
            age: 0.0,
            lifetime: PROJECTILE_LIFETIME_MS,
            dead: false,
        }
    }

    /// Advance by `dt` milliseconds inside a `bounds`-sized play area
    pub fn update(&mut self, dt: f64, bounds: DVec2) {
        self.pos += self.vel * dt / 1000.0;
        self.age += dt;

        let out_of_bounds =
            self.pos.x < 0.0 || self.pos.x > bounds.x || self.pos.y < 0.0 || self.pos.y > bounds.y;
        if out_of_bounds || self.age >= self.lifetime {
            self.dead = true;
        }
    }
}
