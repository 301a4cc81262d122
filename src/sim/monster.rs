//! Monsters and their difficulty scaling
//!
//! Stats are derived in two stages: first the wave / HP-phase scaling law,
//! then the per-kind modifiers. Swapping the stages changes the floored
//! damage and reward values, so the order is fixed here.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::Vitals;

pub const BASE_HEALTH: f64 = 100.0;
pub const BASE_DAMAGE: f64 = 10.0;
pub const BASE_REWARD: f64 = 10.0;
pub const BASE_SPEED: f64 = 30.0;
pub const BASE_SIZE: f64 = 10.0;

/// HP scaling phases beyond this add reward but no further health
pub const MAX_HP_PHASE: u32 = 10;
/// Reward growth stops at this wave
pub const MAX_REWARD_WAVE: u32 = 10;
/// Speed growth stops after this many waves once HP phases are active
pub const MAX_PHASED_SPEED_WAVES: u32 = 10;

/// Monster archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonsterKind {
    #[default]
    Basic,
    Strong,
    Fast,
}

impl MonsterKind {
    pub fn color(self) -> u32 {
        match self {
            MonsterKind::Basic => 0xff6b35,
            MonsterKind::Strong => 0xe74c3c,
            MonsterKind::Fast => 0xf39c12,
        }
    }

    pub fn size(self) -> f64 {
        match self {
            MonsterKind::Basic => BASE_SIZE,
            MonsterKind::Strong => 14.0,
            MonsterKind::Fast => 8.0,
        }
    }
}

/// Combat stats for a monster at a given difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonsterStats {
    pub health: f64,
    pub damage: f64,
    pub reward: f64,
    pub speed: f64,
}

impl MonsterStats {
    /// Stats after wave / HP-phase scaling, before kind modifiers
    pub fn scaled(wave: u32, hp_phase: u32) -> Self {
        let wave = wave.max(1);
        let waves_in = (wave - 1) as f64;

        let scale = 1.0 + waves_in * 0.3;
        let hp_scale = scale * (1.0 + hp_phase.min(MAX_HP_PHASE) as f64 * 5.0);

        let reward_wave = wave.min(MAX_REWARD_WAVE);
        let reward = (BASE_REWARD
            * (1.0 + (reward_wave - 1) as f64 * 0.2)
            * (1.0 + hp_phase as f64 * 2.0))
            .floor();

        let speed = if hp_phase > 0 {
            BASE_SPEED * (1.0 + (wave - 1).min(MAX_PHASED_SPEED_WAVES) as f64 * 0.1)
        } else {
            BASE_SPEED * (1.0 + waves_in * 0.1)
        };

        Self {
            health: BASE_HEALTH * hp_scale,
            damage: (BASE_DAMAGE * scale).floor(),
            reward,
            speed,
        }
    }

    /// Apply kind modifiers on top of already-scaled stats
    pub fn with_kind(self, kind: MonsterKind) -> Self {
        match kind {
            MonsterKind::Basic => self,
            MonsterKind::Strong => Self {
                health: self.health * 2.0,
                damage: self.damage * 1.5,
                reward: self.reward * 2.0,
                speed: self.speed * 0.8,
            },
            MonsterKind::Fast => Self {
                health: self.health * 0.7,
                damage: self.damage,
                reward: self.reward * 1.2,
                speed: self.speed * 2.0,
            },
        }
    }

    /// Full two-stage derivation
    pub fn for_spawn(kind: MonsterKind, wave: u32, hp_phase: u32) -> Self {
        Self::scaled(wave, hp_phase).with_kind(kind)
    }
}

/// A hostile agent walking straight at the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    pub kind: MonsterKind,
    pub pos: DVec2,
    pub vel: DVec2,
    pub size: f64,
    pub vitals: Vitals,
    pub speed: f64,
    pub damage: f64,
    pub reward: f64,
    pub reward_given: bool,
    /// Velocity nudges accumulated this frame (Guardian taunt)
    pub impulse: DVec2,
    /// Remaining slow duration (ms) and its speed multiplier
    pub slow_ms: f64,
    pub slow_factor: f64,
}

impl Monster {
    pub fn spawn(id: u32, kind: MonsterKind, pos: DVec2, wave: u32, hp_phase: u32) -> Self {
        let stats = MonsterStats::for_spawn(kind, wave, hp_phase);
        Self {
            id,
            kind,
            pos,
            vel: DVec2::ZERO,
            size: kind.size(),
            vitals: Vitals::new(stats.health),
            speed: stats.speed,
            damage: stats.damage,
            reward: stats.reward,
            reward_given: false,
            impulse: DVec2::ZERO,
            slow_ms: 0.0,
            slow_factor: 1.0,
        }
    }

    pub fn take_damage(&mut self, amount: f64) -> f64 {
        self.vitals.take_damage(amount)
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.vitals.dead
    }

    /// Add a velocity nudge applied on the next movement step
    pub fn nudge(&mut self, impulse: DVec2) {
        self.impulse += impulse;
    }

    /// Slow movement to `factor` of normal speed for `duration_ms`.
    /// A stronger or longer slow replaces a weaker one.
    pub fn apply_slow(&mut self, factor: f64, duration_ms: f64) {
        self.slow_factor = self.slow_factor.min(factor);
        self.slow_ms = self.slow_ms.max(duration_ms);
    }

    pub fn effective_speed(&self) -> f64 {
        if self.slow_ms > 0.0 {
            self.speed * self.slow_factor
        } else {
            self.speed
        }
    }

    /// Steer toward `core` and move by `dt` milliseconds. A single step
    /// never travels further than the core, so long frames cannot carry a
    /// monster through it.
    pub fn update(&mut self, dt: f64, core: DVec2) {
        let to_core = core - self.pos;
        let dist = to_core.length();
        if dist > 0.0 {
            self.vel = to_core / dist * self.effective_speed();
        }
        self.vel += self.impulse;
        self.impulse = DVec2::ZERO;

        self.pos += (self.vel * dt / 1000.0).clamp_length_max(dist);

        if self.slow_ms > 0.0 {
            self.slow_ms = (self.slow_ms - dt).max(0.0);
            if self.slow_ms == 0.0 {
                self.slow_factor = 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_one_basic_is_base_stats() {
        let m = Monster::spawn(1, MonsterKind::Basic, DVec2::ZERO, 1, 0);
        assert_eq!(m.vitals.health, 100.0);
        assert_eq!(m.vitals.max_health, 100.0);
        assert_eq!(m.damage, 10.0);
        assert_eq!(m.reward, 10.0);
        assert_eq!(m.speed, 30.0);
        assert_eq!(m.size, BASE_SIZE);
    }

    #[test]
    fn test_wave_scaling_floors_damage_and_reward() {
        // wave 6: scale = 2.5, reward factor = 2.0, speed factor = 1.5
        let s = MonsterStats::scaled(6, 0);
        assert!((s.health - 250.0).abs() < 1e-9);
        assert_eq!(s.damage, 25.0);
        assert_eq!(s.reward, 20.0);
        assert!((s.speed - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_reward_caps_at_wave_ten() {
        assert_eq!(MonsterStats::scaled(10, 0).reward, MonsterStats::scaled(25, 0).reward);
    }

    #[test]
    fn test_hp_phase_multiplies_health_and_reward() {
        let base = MonsterStats::scaled(6, 0);
        let phased = MonsterStats::scaled(6, 1);
        assert!((phased.health - base.health * 6.0).abs() < 1e-6);
        // floor(10 * 2.0 * 3)
        assert_eq!(phased.reward, 60.0);
    }

    #[test]
    fn test_phased_speed_is_capped() {
        let a = MonsterStats::scaled(30, 1);
        let b = MonsterStats::scaled(11, 1);
        assert_eq!(a.speed, b.speed);
        assert!((a.speed - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_hp_phase_health_caps_at_ten() {
        let at_cap = MonsterStats::scaled(5, MAX_HP_PHASE);
        let beyond = MonsterStats::scaled(5, MAX_HP_PHASE + 3);
        assert_eq!(at_cap.health, beyond.health);
        assert!(beyond.reward > at_cap.reward);
    }

    #[test]
    fn test_kind_modifiers_apply_after_scaling() {
        let strong = MonsterStats::for_spawn(MonsterKind::Strong, 2, 0);
        // wave 2: damage floor(13) = 13, then x1.5 unfloored
        assert_eq!(strong.damage, 19.5);
        assert!((strong.health - 260.0).abs() < 1e-9);
        assert_eq!(strong.reward, 24.0);

        let fast = MonsterStats::for_spawn(MonsterKind::Fast, 1, 0);
        assert!((fast.health - 70.0).abs() < 1e-9);
        assert_eq!(fast.speed, 60.0);
        assert!((fast.reward - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_monster_walks_toward_core() {
        let core = DVec2::new(400.0, 300.0);
        let mut m = Monster::spawn(1, MonsterKind::Basic, DVec2::new(100.0, 300.0), 1, 0);
        m.update(1000.0, core);
        assert!((m.pos.x - 130.0).abs() < 1e-9);
        assert!((m.pos.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_nudge_is_additive_and_one_shot() {
        let core = DVec2::new(400.0, 300.0);
        let mut m = Monster::spawn(1, MonsterKind::Basic, DVec2::new(100.0, 300.0), 1, 0);
        m.nudge(DVec2::new(0.0, 20.0));
        m.update(1000.0, core);
        assert!((m.pos.y - 320.0).abs() < 1e-9);
        assert_eq!(m.impulse, DVec2::ZERO);
    }

    #[test]
    fn test_long_step_stops_at_core() {
        let core = DVec2::new(400.0, 300.0);
        let mut m = Monster::spawn(1, MonsterKind::Fast, DVec2::new(350.0, 300.0), 30, 0);
        // 4x speed on a clamped 100 ms frame
        m.update(400.0, core);
        assert!(m.pos.distance(core) < 1e-9);
        m.update(400.0, core);
        assert!(m.pos.distance(core) < 1e-9);
    }

    #[test]
    fn test_slow_expires() {
        let core = DVec2::new(400.0, 300.0);
        let mut m = Monster::spawn(1, MonsterKind::Basic, DVec2::new(100.0, 300.0), 1, 0);
        m.apply_slow(0.5, 500.0);
        assert_eq!(m.effective_speed(), 15.0);
        m.update(500.0, core);
        assert_eq!(m.effective_speed(), 30.0);
    }
}
