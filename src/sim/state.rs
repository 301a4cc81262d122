//! Game session and core simulation types
//!
//! `GameSession` owns every entity collection, the economy and the RNG
//! streams. All mutation goes through `tick` and `GameSession::apply`.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::monster::{Monster, MonsterKind};
use super::particle::ParticleField;
use super::projectile::Projectile;
use super::unit::{Unit, UnitKind};
use super::upgrades::{UpgradeKind, UpgradeSystem};
use super::wave::WaveDirector;
use crate::direction;
use crate::settings::Settings;

/// PCG stream selector for cosmetic randomness
const PARTICLE_STREAM: u64 = 0x5eed_0f_da27;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; only pause/speed/restart input is accepted
    Paused,
    /// Run ended, waiting for restart
    GameOver,
}

/// Simulation speed multiplier, cycled 1x -> 2x -> 4x -> 1x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    #[default]
    X1,
    X2,
    X4,
}

impl SpeedMultiplier {
    pub fn next(self) -> Self {
        match self {
            SpeedMultiplier::X1 => SpeedMultiplier::X2,
            SpeedMultiplier::X2 => SpeedMultiplier::X4,
            SpeedMultiplier::X4 => SpeedMultiplier::X1,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            SpeedMultiplier::X1 => 1.0,
            SpeedMultiplier::X2 => 2.0,
            SpeedMultiplier::X4 => 4.0,
        }
    }
}

/// Monotonic entity id allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Events emitted during a frame (for renderer/audio/UI)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    MonsterKilled {
        monster_id: u32,
        kind: MonsterKind,
        reward: f64,
        pos: DVec2,
    },
    WaveAdvanced {
        wave: u32,
    },
    HpPhaseIncreased {
        phase: u32,
    },
    /// A monster reached the core and took a unit with it
    CoreBreached {
        monster_id: u32,
        unit_id: u32,
    },
    UnitPlaced {
        unit_id: u32,
        kind: UnitKind,
        pos: DVec2,
    },
    UnitEvolved {
        unit_id: u32,
        from: UnitKind,
        to: UnitKind,
    },
    UpgradePurchased {
        kind: UpgradeKind,
        level: u32,
        cost: f64,
    },
    GameOver {
        wave: u32,
        time_ms: f64,
    },
    CriticalHit {
        unit_id: u32,
        pos: DVec2,
    },
}

/// A shop purchase waiting for a position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementPending {
    pub kind: UnitKind,
    pub cost: f64,
}

/// Complete session state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameSession {
    pub settings: Settings,
    pub phase: GamePhase,
    pub money: f64,
    pub speed: SpeedMultiplier,
    /// Center of the play area; monsters converge here
    pub core: DVec2,
    /// Play area size
    pub bounds: DVec2,
    /// Units in placement order; evolution keeps the slot
    pub units: Vec<Unit>,
    /// Monsters in spawn order
    pub monsters: Vec<Monster>,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleField,
    pub upgrades: UpgradeSystem,
    pub waves: WaveDirector,
    /// Selected unit id, resolved on demand
    pub selected: Option<u32>,
    pub placement: Option<PlacementPending>,
    pub cursor: DVec2,
    /// Frames simulated since the last (re)start
    pub frame: u64,
    pub(crate) rng: Pcg32,
    pub(crate) ids: EntityIds,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session in the playing state with the starting garrison
    pub fn new(settings: Settings) -> Self {
        let bounds = DVec2::new(settings.arena_width, settings.arena_height);
        let mut session = Self {
            phase: GamePhase::Playing,
            money: settings.starting_money,
            speed: SpeedMultiplier::X1,
            core: bounds / 2.0,
            bounds,
            units: Vec::new(),
            monsters: Vec::new(),
            projectiles: Vec::new(),
            particles: particle_field(&settings),
            upgrades: UpgradeSystem::new(),
            waves: WaveDirector::new(),
            selected: None,
            placement: None,
            cursor: bounds / 2.0,
            frame: 0,
            rng: Pcg32::seed_from_u64(settings.seed),
            ids: EntityIds::default(),
            events: Vec::new(),
            settings,
        };
        session.spawn_garrison();
        log::info!(
            "Session started: seed={} money={} units={}",
            session.settings.seed,
            session.money,
            session.units.len()
        );
        session
    }

    /// Reset to the initial state. Valid from any phase.
    pub fn restart(&mut self) {
        let settings = self.settings.clone();
        *self = Self::new(settings);
    }

    /// Starting warriors evenly spaced on a ring around the core
    fn spawn_garrison(&mut self) {
        let count = self.settings.starting_warriors;
        let radius = self.settings.starting_ring_radius;
        for i in 0..count {
            let angle = i as f64 * std::f64::consts::TAU / count as f64;
            let pos = self.core + direction(angle) * radius;
            let id = self.ids.next_id();
            self.units
                .push(Unit::with_upgrades(id, UnitKind::Warrior, pos, &self.upgrades));
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn wave(&self) -> u32 {
        self.waves.wave
    }

    pub fn hp_phase(&self) -> u32 {
        self.waves.hp_phase
    }

    /// Speed-adjusted play time (ms)
    pub fn time_ms(&self) -> f64 {
        self.waves.elapsed_ms
    }

    pub fn unit(&self, id: u32) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// The selected unit, if it still exists
    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selected.and_then(|id| self.unit(id))
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.money >= cost
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop the selection if its unit is gone
    pub(crate) fn resolve_selection(&mut self) {
        let alive = |id: u32| self.units.iter().any(|u| u.id == id);
        if self.selected.is_some_and(|id| !alive(id)) {
            self.selected = None;
        }
    }
}

fn particle_field(settings: &Settings) -> ParticleField {
    ParticleField::new(
        settings.particle_budget(),
        Pcg32::new(settings.seed, PARTICLE_STREAM),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_garrison() {
        let session = GameSession::new(Settings::default());
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.money, 250.0);
        assert_eq!(session.core, DVec2::new(400.0, 300.0));
        assert_eq!(session.units.len(), 3);
        for unit in &session.units {
            assert_eq!(unit.kind, UnitKind::Warrior);
            assert!((unit.pos.distance(session.core) - 80.0).abs() < 1e-9);
        }
        assert!((session.units[0].pos - DVec2::new(480.0, 300.0)).length() < 1e-9);
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut session = GameSession::new(Settings::default());
        let a = session.ids.next_id();
        let b = session.ids.next_id();
        assert!(b > a);
        assert!(session.units.iter().all(|u| u.id < a));
    }

    #[test]
    fn test_speed_cycles() {
        let s = SpeedMultiplier::X1;
        assert_eq!(s.next(), SpeedMultiplier::X2);
        assert_eq!(s.next().next(), SpeedMultiplier::X4);
        assert_eq!(s.next().next().next(), SpeedMultiplier::X1);
        assert_eq!(SpeedMultiplier::X4.factor(), 4.0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = GameSession::new(Settings::default());
        session.money = 5.0;
        session.phase = GamePhase::GameOver;
        session.units.clear();
        session.upgrades.purchase(UpgradeKind::Range);
        session.speed = SpeedMultiplier::X4;
        session.selected = Some(2);

        session.restart();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.money, 250.0);
        assert_eq!(session.units.len(), 3);
        assert_eq!(session.upgrades.range.level, 0);
        assert_eq!(session.speed, SpeedMultiplier::X1);
        assert_eq!(session.selected, None);
        assert_eq!(session.wave(), 1);
    }

    #[test]
    fn test_selection_resolves_to_none_when_unit_is_gone() {
        let mut session = GameSession::new(Settings::default());
        let id = session.units[1].id;
        session.selected = Some(id);
        assert_eq!(session.selected_unit().map(|u| u.id), Some(id));
        session.units.remove(1);
        session.resolve_selection();
        assert_eq!(session.selected, None);
    }
}
