//! Wave progression and spawn scheduling
//!
//! Waves advance on a fixed 30 s clock regardless of kills. Up to wave 10
//! the spawn interval shrinks linearly; after that it decays exponentially
//! until it bottoms out, at which point difficulty moves into monster health
//! via HP scaling phases and the interval is reset.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::monster::MonsterKind;
use crate::consts::{SPAWN_OFFSET, WAVE_DURATION_MS};

/// Spawn interval at the start of a run (ms)
pub const INITIAL_SPAWN_RATE: f64 = 2000.0;
/// Early-wave interval never drops below this (ms)
pub const EARLY_SPAWN_FLOOR: f64 = 500.0;
/// Early-wave interval reduction per wave (ms)
pub const EARLY_SPAWN_STEP: f64 = 100.0;
/// Live interval reduction applied at each wave boundary, and its floor
pub const WAVE_BOUNDARY_DECREMENT: f64 = 50.0;
pub const WAVE_BOUNDARY_FLOOR: f64 = 300.0;
/// Last wave of the linear schedule
pub const LATE_GAME_WAVE: u32 = 10;
/// Late-game exponential decay: `base * DECAY^(wave - origin)`
pub const LATE_GAME_BASE_RATE: f64 = 500.0;
pub const LATE_GAME_DECAY: f64 = 0.85;
pub const MIN_SPAWN_RATE: f64 = 10.0;
/// Interval after an HP scaling phase kicks in
pub const PHASE_RESET_RATE: f64 = 300.0;

/// Fast monsters appear from this wave, with this draw threshold
pub const FAST_MIN_WAVE: u32 = 3;
pub const FAST_CHANCE: f64 = 0.15;
/// Strong monsters appear from this wave, with this draw threshold
pub const STRONG_MIN_WAVE: u32 = 2;
pub const STRONG_CHANCE: f64 = 0.25;

/// A monster the director wants spawned this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: MonsterKind,
    pub pos: DVec2,
}

/// Result of advancing the director by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaveUpdate {
    pub spawn: Option<SpawnRequest>,
    pub phase_increased: bool,
}

/// Owner of the wave clock and spawn schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: u32,
    /// Speed-adjusted play time (ms)
    pub elapsed_ms: f64,
    pub spawn_timer: f64,
    /// Interval tracked across wave boundaries (early schedule)
    pub live_spawn_rate: f64,
    pub hp_phase: u32,
    /// Late-game decay restarts from here after each HP phase
    pub decay_origin_wave: u32,
    pub decay_origin_rate: f64,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            wave: 1,
            elapsed_ms: 0.0,
            spawn_timer: 0.0,
            live_spawn_rate: INITIAL_SPAWN_RATE,
            hp_phase: 0,
            decay_origin_wave: LATE_GAME_WAVE,
            decay_origin_rate: LATE_GAME_BASE_RATE,
        }
    }

    /// Time between spawns (ms) for the current wave
    pub fn spawn_rate(&self) -> f64 {
        if self.wave <= LATE_GAME_WAVE {
            let linear = self.live_spawn_rate - EARLY_SPAWN_STEP * (self.wave - 1) as f64;
            linear.max(EARLY_SPAWN_FLOOR)
        } else {
            let waves_past = self.wave.saturating_sub(self.decay_origin_wave) as i32;
            (self.decay_origin_rate * LATE_GAME_DECAY.powi(waves_past)).max(MIN_SPAWN_RATE)
        }
    }

    /// Advance clocks by `dt` ms and decide whether to spawn
    pub fn update(&mut self, dt: f64, rng: &mut Pcg32, bounds: DVec2) -> WaveUpdate {
        self.elapsed_ms += dt;
        self.spawn_timer += dt;

        let mut update = WaveUpdate::default();

        if self.wave > LATE_GAME_WAVE
            && self.spawn_rate() <= MIN_SPAWN_RATE
            && self.spawn_timer >= MIN_SPAWN_RATE
        {
            self.hp_phase += 1;
            self.decay_origin_wave = self.wave;
            self.decay_origin_rate = PHASE_RESET_RATE;
            update.phase_increased = true;
        }

        if self.spawn_timer >= self.spawn_rate() {
            self.spawn_timer = 0.0;
            let kind = self.pick_kind(rng);
            let pos = spawn_position(rng, bounds);
            update.spawn = Some(SpawnRequest { kind, pos });
        }

        update
    }

    /// Monster kind for the next spawn. A single draw is shared; the fast
    /// check runs first and can mask the strong one.
    pub fn pick_kind(&self, rng: &mut Pcg32) -> MonsterKind {
        let draw = rng.random::<f64>();
        kind_for_draw(self.wave, draw)
    }

    /// Step to the next wave once its 30 s window has elapsed.
    /// At most one wave per call.
    pub fn check_wave_advance(&mut self) -> bool {
        if self.elapsed_ms > self.wave as f64 * WAVE_DURATION_MS {
            self.wave += 1;
            self.live_spawn_rate =
                (self.live_spawn_rate - WAVE_BOUNDARY_DECREMENT).max(WAVE_BOUNDARY_FLOOR);
            true
        } else {
            false
        }
    }

    /// Milliseconds until the next wave boundary
    pub fn next_wave_in_ms(&self) -> f64 {
        (self.wave as f64 * WAVE_DURATION_MS - self.elapsed_ms).max(0.0)
    }
}

/// Kind selection for a given wave and uniform draw in `[0, 1)`
pub fn kind_for_draw(wave: u32, draw: f64) -> MonsterKind {
    if wave >= FAST_MIN_WAVE && draw < FAST_CHANCE {
        MonsterKind::Fast
    } else if wave >= STRONG_MIN_WAVE && draw < STRONG_CHANCE {
        MonsterKind::Strong
    } else {
        MonsterKind::Basic
    }
}

/// Uniform edge, uniform coordinate along it, just outside the bounds
pub fn spawn_position(rng: &mut Pcg32, bounds: DVec2) -> DVec2 {
    match rng.random_range(0..4u8) {
        0 => DVec2::new(rng.random::<f64>() * bounds.x, -SPAWN_OFFSET),
        1 => DVec2::new(bounds.x + SPAWN_OFFSET, rng.random::<f64>() * bounds.y),
        2 => DVec2::new(rng.random::<f64>() * bounds.x, bounds.y + SPAWN_OFFSET),
        _ => DVec2::new(-SPAWN_OFFSET, rng.random::<f64>() * bounds.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    use rand::SeedableRng;

    const BOUNDS: DVec2 = DVec2::new(ARENA_WIDTH, ARENA_HEIGHT);

    #[test]
    fn test_early_schedule_tracks_live_rate() {
        let mut director = WaveDirector::new();
        assert_eq!(director.spawn_rate(), 2000.0);

        director.elapsed_ms = 30_001.0;
        assert!(director.check_wave_advance());
        assert_eq!(director.wave, 2);
        assert_eq!(director.live_spawn_rate, 1950.0);
        // 1950 - 100
        assert_eq!(director.spawn_rate(), 1850.0);
    }

    #[test]
    fn test_early_schedule_floor() {
        let mut director = WaveDirector::new();
        director.wave = 10;
        director.live_spawn_rate = 1000.0;
        assert_eq!(director.spawn_rate(), EARLY_SPAWN_FLOOR);
    }

    #[test]
    fn test_late_schedule_decays() {
        let mut director = WaveDirector::new();
        director.wave = 11;
        assert!((director.spawn_rate() - 425.0).abs() < 1e-9);
        director.wave = 60;
        assert_eq!(director.spawn_rate(), MIN_SPAWN_RATE);
    }

    #[test]
    fn test_hp_phase_when_rate_bottoms_out() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut director = WaveDirector::new();
        director.wave = 40;
        assert_eq!(director.spawn_rate(), MIN_SPAWN_RATE);

        let update = director.update(5.0, &mut rng, BOUNDS);
        assert!(!update.phase_increased);

        let update = director.update(5.0, &mut rng, BOUNDS);
        assert!(update.phase_increased);
        assert_eq!(director.hp_phase, 1);
        assert_eq!(director.spawn_rate(), PHASE_RESET_RATE);
        // timer (10ms) is below the reset rate, so nothing spawns yet
        assert!(update.spawn.is_none());
    }

    #[test]
    fn test_wave_advances_once_per_check() {
        let mut director = WaveDirector::new();
        director.elapsed_ms = 95_000.0;
        assert!(director.check_wave_advance());
        assert!(director.check_wave_advance());
        assert!(director.check_wave_advance());
        assert!(!director.check_wave_advance());
        assert_eq!(director.wave, 4);
    }

    #[test]
    fn test_wave_boundary_is_strict() {
        let mut director = WaveDirector::new();
        director.elapsed_ms = 30_000.0;
        assert!(!director.check_wave_advance());
    }

    #[test]
    fn test_kind_precedence() {
        assert_eq!(kind_for_draw(1, 0.0), MonsterKind::Basic);
        assert_eq!(kind_for_draw(2, 0.10), MonsterKind::Strong);
        assert_eq!(kind_for_draw(3, 0.10), MonsterKind::Fast);
        assert_eq!(kind_for_draw(3, 0.20), MonsterKind::Strong);
        assert_eq!(kind_for_draw(3, 0.30), MonsterKind::Basic);
    }

    #[test]
    fn test_spawn_positions_are_outside_bounds() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let pos = spawn_position(&mut rng, BOUNDS);
            let outside = pos.x < 0.0 || pos.x > BOUNDS.x || pos.y < 0.0 || pos.y > BOUNDS.y;
            assert!(outside, "{pos:?} inside bounds");
        }
    }

    #[test]
    fn test_spawns_once_timer_reaches_rate() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut director = WaveDirector::new();
        assert!(director.update(1999.0, &mut rng, BOUNDS).spawn.is_none());
        assert!(director.update(1.0, &mut rng, BOUNDS).spawn.is_some());
        assert_eq!(director.spawn_timer, 0.0);
    }
}
