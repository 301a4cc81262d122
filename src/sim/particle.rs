//! Cosmetic particles
//!
//! Particles never touch gameplay state. They draw from their own RNG stream
//! so enabling or disabling them leaves the simulation unchanged.

use std::collections::VecDeque;

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Hit spark on direct projectile impact
pub const COLOR_HIT: u32 = 0xff6b35;
/// Splash burst from area projectiles
pub const COLOR_SPLASH: u32 = 0x9b59b6;
/// Reward sparkle when a monster pays out
pub const COLOR_REWARD: u32 = 0xf39c12;
/// Extra burst for strong monsters
pub const COLOR_STRONG_KILL: u32 = 0xe74c3c;
/// Chain lightning arcs
pub const COLOR_LIGHTNING: u32 = 0x74b9ff;
/// Frost shatter
pub const COLOR_FROST: u32 = 0x81ecec;

/// Drift speed range (pixels/second, per axis)
const DRIFT_SPEED: f64 = 60.0;

/// A short-lived visual effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: DVec2,
    pub vel: DVec2,
    pub color: u32,
    pub size: f64,
    pub age: f64,
    pub lifetime: f64,
    pub dead: bool,
}

impl Particle {
    pub fn new(pos: DVec2, color: u32, lifetime: f64, rng: &mut Pcg32) -> Self {
        let vel = DVec2::new(
            (rng.random::<f64>() - 0.5) * 2.0 * DRIFT_SPEED,
            (rng.random::<f64>() - 0.5) * 2.0 * DRIFT_SPEED,
        );
        Self {
            pos,
            vel,
            color,
            size: rng.random::<f64>() * 4.0 + 2.0,
            age: 0.0,
            lifetime,
            dead: lifetime <= 0.0,
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.age += dt;
        self.pos += self.vel * dt / 1000.0;
        if self.age >= self.lifetime {
            self.dead = true;
        }
    }

    /// Opacity fading linearly from 1 to 0 over the lifetime
    pub fn alpha(&self) -> f64 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Particle pool with a hard cap; the oldest particle is evicted when full.
/// A cap of zero disables emission.
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub particles: VecDeque<Particle>,
    pub max_particles: usize,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(max_particles: usize, rng: Pcg32) -> Self {
        Self {
            particles: VecDeque::with_capacity(max_particles),
            max_particles,
            rng,
        }
    }

    /// Emit a single particle at `pos`
    pub fn emit(&mut self, pos: DVec2, color: u32, lifetime: f64) {
        self.burst(pos, 0.0, color, lifetime, 1);
    }

    /// Emit `count` particles scattered within `spread` pixels of `center`
    pub fn burst(&mut self, center: DVec2, spread: f64, color: u32, lifetime: f64, count: usize) {
        if self.max_particles == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                self.particles.pop_front();
            }
            let offset = DVec2::new(
                (self.rng.random::<f64>() - 0.5) * spread,
                (self.rng.random::<f64>() - 0.5) * spread,
            );
            let particle = Particle::new(center + offset, color, lifetime, &mut self.rng);
            self.particles.push_back(particle);
        }
    }

    pub fn update(&mut self, dt: f64) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
    }

    pub fn prune(&mut self) {
        self.particles.retain(|p| !p.dead);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_particle_fades_and_expires() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particle = Particle::new(DVec2::ZERO, COLOR_HIT, 300.0, &mut rng);
        particle.update(150.0);
        assert!((particle.alpha() - 0.5).abs() < 1e-9);
        assert!(!particle.dead);
        particle.update(150.0);
        assert!(particle.dead);
    }

    #[test]
    fn test_field_respects_cap() {
        let mut field = ParticleField::new(5, Pcg32::seed_from_u64(1));
        field.burst(DVec2::new(10.0, 10.0), 20.0, COLOR_SPLASH, 400.0, 3);
        field.burst(DVec2::new(90.0, 90.0), 0.0, COLOR_REWARD, 400.0, 4);
        assert_eq!(field.len(), 5);
        // The two oldest splash particles were evicted first
        assert_eq!(field.particles.front().map(|p| p.color), Some(COLOR_SPLASH));
        assert_eq!(field.particles.iter().filter(|p| p.color == COLOR_REWARD).count(), 4);
    }

    #[test]
    fn test_zero_budget_emits_nothing() {
        let mut field = ParticleField::new(0, Pcg32::seed_from_u64(1));
        field.burst(DVec2::ZERO, 10.0, COLOR_REWARD, 500.0, 8);
        assert!(field.is_empty());
    }
}
