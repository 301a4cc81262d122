//! Read-only frame snapshots
//!
//! A `FrameSnapshot` is everything a renderer needs to draw one frame, with
//! no references back into the session.

use glam::DVec2;
use serde::Serialize;

use crate::sim::{
    GameEvent, GamePhase, GameSession, MonsterKind, PlacementError, UnitKind, UpgradeKind,
};

pub const HEALTH_HIGH: u32 = 0x4ecdc4;
pub const HEALTH_LOW: u32 = 0xe74c3c;

/// Health bar color: teal above half health, red at or below
pub fn health_color(fraction: f64) -> u32 {
    if fraction > 0.5 { HEALTH_HIGH } else { HEALTH_LOW }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView {
    pub id: u32,
    pub kind: UnitKind,
    pub pos: DVec2,
    pub size: f64,
    pub color: u32,
    pub health_fraction: f64,
    pub bar_color: u32,
    pub range: f64,
    pub evolved: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterView {
    pub id: u32,
    pub kind: MonsterKind,
    pub pos: DVec2,
    pub size: f64,
    pub color: u32,
    pub health_fraction: f64,
    pub bar_color: u32,
    pub slowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub pos: DVec2,
    pub size: f64,
    pub color: u32,
    /// Drawn with a distinct marker
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: DVec2,
    pub size: f64,
    pub color: u32,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopEntry {
    pub kind: UnitKind,
    pub cost: f64,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeEntry {
    pub kind: UpgradeKind,
    pub level: u32,
    pub cost: f64,
    pub affordable: bool,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub phase: GamePhase,
    pub money: f64,
    pub wave: u32,
    pub hp_phase: u32,
    pub time_ms: f64,
    pub next_wave_in_ms: f64,
    pub speed: f64,
    pub unit_count: usize,
    pub monster_count: usize,
    pub shop: Vec<ShopEntry>,
    pub upgrades: Vec<UpgradeEntry>,
}

/// Ghost of the unit being placed, at the cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementPreview {
    pub kind: UnitKind,
    pub cursor: DVec2,
    pub size: f64,
    pub range: f64,
    pub valid: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionOption {
    pub name: &'static str,
    pub cost: f64,
    pub description: &'static str,
    pub affordable: bool,
}

/// Evolution choices for the selected unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPanel {
    pub unit_id: u32,
    pub kind: UnitKind,
    pub options: Vec<EvolutionOption>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub bounds: DVec2,
    pub core: DVec2,
    pub hud: HudView,
    pub units: Vec<UnitView>,
    pub monsters: Vec<MonsterView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub placement: Option<PlacementPreview>,
    pub selected: Option<u32>,
    pub evolution: Option<EvolutionPanel>,
    pub events: Vec<GameEvent>,
}

impl FrameSnapshot {
    /// Capture the session along with the events drained for this frame
    pub fn capture(session: &GameSession, events: Vec<GameEvent>) -> Self {
        Self {
            frame: session.frame,
            bounds: session.bounds,
            core: session.core,
            hud: hud(session),
            units: session
                .units
                .iter()
                .map(|u| UnitView {
                    id: u.id,
                    kind: u.kind,
                    pos: u.pos,
                    size: u.size,
                    color: u.color(),
                    health_fraction: u.vitals.fraction(),
                    bar_color: health_color(u.vitals.fraction()),
                    range: u.range,
                    evolved: u.evolved,
                    selected: session.selected == Some(u.id),
                })
                .collect(),
            monsters: session
                .monsters
                .iter()
                .map(|m| MonsterView {
                    id: m.id,
                    kind: m.kind,
                    pos: m.pos,
                    size: m.size,
                    color: m.kind.color(),
                    health_fraction: m.vitals.fraction(),
                    bar_color: health_color(m.vitals.fraction()),
                    slowed: m.slow_ms > 0.0,
                })
                .collect(),
            projectiles: session
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.pos,
                    size: p.size,
                    color: p.color,
                    critical: p.critical,
                })
                .collect(),
            particles: session
                .particles
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    size: p.size,
                    color: p.color,
                    alpha: p.alpha(),
                })
                .collect(),
            placement: placement_preview(session),
            selected: session.selected_unit().map(|u| u.id),
            evolution: evolution_panel(session),
            events,
        }
    }
}

fn hud(session: &GameSession) -> HudView {
    HudView {
        phase: session.phase,
        money: session.money,
        wave: session.wave(),
        hp_phase: session.hp_phase(),
        time_ms: session.time_ms(),
        next_wave_in_ms: session.waves.next_wave_in_ms(),
        speed: session.speed.factor(),
        unit_count: session.units.len(),
        monster_count: session.monsters.len(),
        shop: UnitKind::PURCHASABLE
            .iter()
            .filter_map(|&kind| {
                kind.cost().map(|cost| ShopEntry {
                    kind,
                    cost,
                    affordable: session.can_afford(cost),
                })
            })
            .collect(),
        upgrades: UpgradeKind::ALL
            .iter()
            .map(|&kind| {
                let track = session.upgrades.track(kind);
                UpgradeEntry {
                    kind,
                    level: track.level,
                    cost: track.cost,
                    affordable: session.can_afford(track.cost),
                }
            })
            .collect(),
    }
}

fn placement_preview(session: &GameSession) -> Option<PlacementPreview> {
    let pending = session.placement?;
    let profile = pending.kind.profile();
    let check: Result<(), PlacementError> = session.validate_placement(session.cursor);
    Some(PlacementPreview {
        kind: pending.kind,
        cursor: session.cursor,
        size: profile.size,
        range: session.upgrades.range.apply(profile.range),
        valid: check.is_ok(),
        reason: check.err().map(|e| e.to_string()),
    })
}

fn evolution_panel(session: &GameSession) -> Option<EvolutionPanel> {
    let unit = session.selected_unit()?;
    if !unit.can_evolve || unit.evolved {
        return None;
    }
    Some(EvolutionPanel {
        unit_id: unit.id,
        kind: unit.kind,
        options: unit
            .evolution_paths()
            .iter()
            .map(|path| EvolutionOption {
                name: path.name,
                cost: path.cost,
                description: path.description,
                affordable: session.can_afford(path.cost),
            })
            .collect(),
    })
}
