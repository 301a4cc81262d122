//! Defensive units
//!
//! Every unit variant shares one `Unit` struct. What differs between
//! variants lives in a static `UnitProfile` table: base stats, how the unit
//! attacks, and optional capabilities (damage reduction, taunt, rage).

use std::fmt;

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::Vitals;
use super::monster::Monster;
use super::projectile::{Element, Projectile, ProjectileKind};
use super::state::{EntityIds, GameEvent};
use super::upgrades::{UpgradeLevels, UpgradeSystem, apply_level};
use crate::{angle_between, distance};

/// Unit variants, base and evolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Warrior,
    Ranger,
    Wizard,
    Guardian,
    Berserker,
    Sniper,
    Hunter,
    Archmage,
    Elementalist,
}

impl UnitKind {
    /// Kinds that can be bought from the shop
    pub const PURCHASABLE: [UnitKind; 3] = [UnitKind::Warrior, UnitKind::Ranger, UnitKind::Wizard];

    pub fn profile(self) -> &'static UnitProfile {
        match self {
            UnitKind::Warrior => &WARRIOR,
            UnitKind::Ranger => &RANGER,
            UnitKind::Wizard => &WIZARD,
            UnitKind::Guardian => &GUARDIAN,
            UnitKind::Berserker => &BERSERKER,
            UnitKind::Sniper => &SNIPER,
            UnitKind::Hunter => &HUNTER,
            UnitKind::Archmage => &ARCHMAGE,
            UnitKind::Elementalist => &ELEMENTALIST,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Shop price, `None` for evolved kinds
    pub fn cost(self) -> Option<f64> {
        self.profile().cost
    }

    pub fn evolution_paths(self) -> &'static [EvolutionPath] {
        match self {
            UnitKind::Warrior => &WARRIOR_PATHS,
            UnitKind::Ranger => &RANGER_PATHS,
            UnitKind::Wizard => &WIZARD_PATHS,
            _ => &[],
        }
    }

    pub fn is_evolved(self) -> bool {
        self.profile().cost.is_none()
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a unit delivers damage when its attack timer fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackStyle {
    /// No projectile; damage comes from body contact
    Melee,
    Bolt,
    Magic,
    MultiShot { count: u32, spread: f64 },
    Critical { chance: f64, multiplier: f64 },
    ChainLightning,
    Elemental,
}

/// Guardian aura pulling monsters toward the unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taunt {
    pub radius: f64,
    /// Added velocity (pixels/second) toward the unit
    pub pull: f64,
}

/// Berserker rage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rage {
    /// Attack interval shrinks by up to this fraction at zero health
    pub max_speedup: f64,
    /// Heal `melee_damage * lifesteal` on every attack
    pub lifesteal: f64,
}

/// Static description of a unit variant
#[derive(Debug, Clone, PartialEq)]
pub struct UnitProfile {
    pub name: &'static str,
    pub cost: Option<f64>,
    pub health: f64,
    pub size: f64,
    pub attack_rate: f64,
    pub range: f64,
    pub melee_damage: f64,
    pub projectile_damage: f64,
    pub projectile_speed: f64,
    pub color: u32,
    pub attack: AttackStyle,
    /// Fraction of incoming damage absorbed (mana shield)
    pub damage_reduction: f64,
    pub taunt: Option<Taunt>,
    pub rage: Option<Rage>,
}

static WARRIOR: UnitProfile = UnitProfile {
    name: "Warrior",
    cost: Some(50.0),
    health: 150.0,
    size: 12.0,
    attack_rate: 800.0,
    range: 25.0,
    melee_damage: 25.0,
    projectile_damage: 0.0,
    projectile_speed: 200.0,
    color: 0xe74c3c,
    attack: AttackStyle::Melee,
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

static RANGER: UnitProfile = UnitProfile {
    name: "Ranger",
    cost: Some(75.0),
    health: 80.0,
    size: 10.0,
    attack_rate: 600.0,
    range: 120.0,
    melee_damage: 5.0,
    projectile_damage: 20.0,
    projectile_speed: 300.0,
    color: 0x2ecc71,
    attack: AttackStyle::Bolt,
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

static WIZARD: UnitProfile = UnitProfile {
    name: "Wizard",
    cost: Some(100.0),
    health: 60.0,
    size: 10.0,
    attack_rate: 1200.0,
    range: 100.0,
    melee_damage: 5.0,
    projectile_damage: 35.0,
    projectile_speed: 250.0,
    color: 0x9b59b6,
    attack: AttackStyle::Magic,
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

static GUARDIAN: UnitProfile = UnitProfile {
    name: "Guardian",
    cost: None,
    health: 300.0,
    size: 14.0,
    attack_rate: 800.0,
    range: 30.0,
    melee_damage: 30.0,
    projectile_damage: 0.0,
    projectile_speed: 200.0,
    color: 0xc0392b,
    attack: AttackStyle::Melee,
    damage_reduction: 0.0,
    taunt: Some(Taunt {
        radius: 60.0,
        pull: 20.0,
    }),
    rage: None,
};

static BERSERKER: UnitProfile = UnitProfile {
    name: "Berserker",
    cost: None,
    health: 200.0,
    size: 12.0,
    attack_rate: 600.0,
    range: 25.0,
    melee_damage: 40.0,
    projectile_damage: 0.0,
    projectile_speed: 200.0,
    color: 0xd35400,
    attack: AttackStyle::Melee,
    damage_reduction: 0.0,
    taunt: None,
    rage: Some(Rage {
        max_speedup: 0.5,
        lifesteal: 0.3,
    }),
};

static SNIPER: UnitProfile = UnitProfile {
    name: "Sniper",
    cost: None,
    health: 70.0,
    size: 10.0,
    attack_rate: 1500.0,
    range: 250.0,
    melee_damage: 5.0,
    projectile_damage: 60.0,
    projectile_speed: 600.0,
    color: 0x27ae60,
    attack: AttackStyle::Critical {
        chance: 0.25,
        multiplier: 2.5,
    },
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

static HUNTER: UnitProfile = UnitProfile {
    name: "Hunter",
    cost: None,
    health: 90.0,
    size: 10.0,
    attack_rate: 700.0,
    range: 140.0,
    melee_damage: 5.0,
    projectile_damage: 18.0,
    projectile_speed: 350.0,
    color: 0x16a085,
    attack: AttackStyle::MultiShot {
        count: 3,
        spread: 0.2,
    },
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

static ARCHMAGE: UnitProfile = UnitProfile {
    name: "Archmage",
    cost: None,
    health: 80.0,
    size: 11.0,
    attack_rate: 1400.0,
    range: 130.0,
    melee_damage: 5.0,
    projectile_damage: 45.0,
    projectile_speed: 280.0,
    color: 0x8e44ad,
    attack: AttackStyle::ChainLightning,
    damage_reduction: 0.5,
    taunt: None,
    rage: None,
};

static ELEMENTALIST: UnitProfile = UnitProfile {
    name: "Elementalist",
    cost: None,
    health: 70.0,
    size: 11.0,
    attack_rate: 1000.0,
    range: 120.0,
    melee_damage: 5.0,
    projectile_damage: 40.0,
    projectile_speed: 260.0,
    color: 0x6c5ce7,
    attack: AttackStyle::Elemental,
    damage_reduction: 0.0,
    taunt: None,
    rage: None,
};

/// One branch of a unit's evolution tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvolutionPath {
    pub name: &'static str,
    pub target: UnitKind,
    pub cost: f64,
    pub description: &'static str,
}

static WARRIOR_PATHS: [EvolutionPath; 2] = [
    EvolutionPath {
        name: "Guardian",
        target: UnitKind::Guardian,
        cost: 200.0,
        description: "Heavy armor. Taunts nearby monsters toward itself.",
    },
    EvolutionPath {
        name: "Berserker",
        target: UnitKind::Berserker,
        cost: 200.0,
        description: "Attacks faster as health drops. Heals on every swing.",
    },
];

static RANGER_PATHS: [EvolutionPath; 2] = [
    EvolutionPath {
        name: "Sniper",
        target: UnitKind::Sniper,
        cost: 250.0,
        description: "Extreme range. 25% chance to crit for 2.5x damage.",
    },
    EvolutionPath {
        name: "Hunter",
        target: UnitKind::Hunter,
        cost: 250.0,
        description: "Looses three arrows in a spread.",
    },
];

static WIZARD_PATHS: [EvolutionPath; 2] = [
    EvolutionPath {
        name: "Archmage",
        target: UnitKind::Archmage,
        cost: 300.0,
        description: "Mana shield halves damage taken. Chain lightning.",
    },
    EvolutionPath {
        name: "Elementalist",
        target: UnitKind::Elementalist,
        cost: 300.0,
        description: "Cycles fire, frost and storm bolts.",
    },
];

/// Mutable world state a unit touches while attacking
pub struct AttackContext<'a> {
    pub monsters: &'a mut [Monster],
    pub projectiles: &'a mut Vec<Projectile>,
    pub ids: &'a mut EntityIds,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<GameEvent>,
}

/// A stationary defender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: u32,
    pub kind: UnitKind,
    pub pos: DVec2,
    pub size: f64,
    pub vitals: Vitals,
    /// Milliseconds accumulated toward the next attack
    pub attack_timer: f64,
    pub base_attack_rate: f64,
    pub attack_rate: f64,
    pub base_range: f64,
    pub range: f64,
    pub base_melee_damage: f64,
    pub melee_damage: f64,
    pub base_projectile_damage: f64,
    pub projectile_damage: f64,
    pub projectile_speed: f64,
    /// Upgrade levels currently baked into the stats above
    pub levels: UpgradeLevels,
    pub can_evolve: bool,
    pub evolved: bool,
    /// Next element for elemental shots
    pub next_element: Element,
}

impl Unit {
    /// Construct a unit with base stats (no upgrades applied)
    pub fn new(id: u32, kind: UnitKind, pos: DVec2) -> Self {
        let p = kind.profile();
        let evolved = kind.is_evolved();
        Self {
            id,
            kind,
            pos,
            size: p.size,
            vitals: Vitals::new(p.health),
            attack_timer: 0.0,
            base_attack_rate: p.attack_rate,
            attack_rate: p.attack_rate,
            base_range: p.range,
            range: p.range,
            base_melee_damage: p.melee_damage,
            melee_damage: p.melee_damage,
            base_projectile_damage: p.projectile_damage,
            projectile_damage: p.projectile_damage,
            projectile_speed: p.projectile_speed,
            levels: UpgradeLevels::default(),
            can_evolve: !evolved && !kind.evolution_paths().is_empty(),
            evolved,
            next_element: Element::Fire,
        }
    }

    /// Construct a unit and bake in the current global upgrades
    pub fn with_upgrades(id: u32, kind: UnitKind, pos: DVec2, upgrades: &UpgradeSystem) -> Self {
        let mut unit = Self::new(id, kind, pos);
        unit.apply_upgrades(upgrades);
        unit
    }

    pub fn profile(&self) -> &'static UnitProfile {
        self.kind.profile()
    }

    pub fn color(&self) -> u32 {
        self.profile().color
    }

    pub fn evolution_paths(&self) -> &'static [EvolutionPath] {
        if self.can_evolve {
            self.kind.evolution_paths()
        } else {
            &[]
        }
    }

    /// Recompute upgradeable stats from base values. A no-op when the
    /// levels already match.
    pub fn apply_upgrades(&mut self, upgrades: &UpgradeSystem) {
        let levels = upgrades.levels();
        if levels == self.levels {
            return;
        }
        let damage = &upgrades.damage;
        self.melee_damage = apply_level(self.base_melee_damage, damage.multiplier, levels.damage);
        self.projectile_damage =
            apply_level(self.base_projectile_damage, damage.multiplier, levels.damage);
        self.attack_rate = upgrades.attack_speed.apply(self.base_attack_rate);
        self.range = upgrades.range.apply(self.base_range);
        self.levels = levels;
    }

    /// Incoming damage after any damage-reduction capability
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let reduction = self.profile().damage_reduction;
        self.vitals.take_damage(amount * (1.0 - reduction))
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.vitals.dead
    }

    /// Attack interval after rage
    pub fn effective_attack_rate(&self) -> f64 {
        match self.profile().rage {
            Some(rage) => self.attack_rate * (1.0 - rage.max_speedup * self.vitals.missing_fraction()),
            None => self.attack_rate,
        }
    }

    /// Index of the nearest living monster within range. Ties keep the
    /// first monster in iteration (spawn) order.
    pub fn find_target(&self, monsters: &[Monster]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, monster) in monsters.iter().enumerate() {
            if monster.is_dead() {
                continue;
            }
            let d = distance(self.pos, monster.pos);
            if d <= self.range && best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Advance timers by `dt` milliseconds and attack when ready.
    ///
    /// Returns true if the unit attacked a target this tick.
    pub fn update(&mut self, dt: f64, ctx: &mut AttackContext<'_>) -> bool {
        if let Some(taunt) = self.profile().taunt {
            self.taunt(taunt, ctx.monsters);
        }

        self.attack_timer += dt;
        if self.attack_timer < self.effective_attack_rate() {
            return false;
        }
        // Overflow is dropped, not carried into the next cycle
        self.attack_timer = 0.0;
        self.attack(ctx)
    }

    fn taunt(&self, taunt: Taunt, monsters: &mut [Monster]) {
        for monster in monsters.iter_mut().filter(|m| !m.is_dead()) {
            let to_unit = self.pos - monster.pos;
            let d = to_unit.length();
            if d > 0.0 && d <= taunt.radius {
                monster.nudge(to_unit / d * taunt.pull);
            }
        }
    }

    fn attack(&mut self, ctx: &mut AttackContext<'_>) -> bool {
        let Some(target) = self.find_target(ctx.monsters) else {
            return false;
        };
        let target_pos = ctx.monsters[target].pos;
        let angle = angle_between(self.pos, target_pos);
        let profile = self.profile();

        if self.projectile_damage > 0.0 {
            match profile.attack {
                AttackStyle::Melee => {}
                AttackStyle::Bolt => self.shoot(ctx, angle, ProjectileKind::Bolt),
                AttackStyle::Magic => self.shoot(ctx, angle, ProjectileKind::magic()),
                AttackStyle::ChainLightning => {
                    self.shoot(ctx, angle, ProjectileKind::chain_lightning())
                }
                AttackStyle::MultiShot { count, spread } => {
                    let center = (count.saturating_sub(1)) as f64 / 2.0;
                    for i in 0..count {
                        let offset = (i as f64 - center) * spread;
                        self.shoot(ctx, angle + offset, ProjectileKind::Bolt);
                    }
                }
                AttackStyle::Critical { chance, multiplier } => {
                    let critical = ctx.rng.random::<f64>() < chance;
                    let mut projectile = self.projectile(ctx.ids, angle, ProjectileKind::Bolt);
                    if critical {
                        projectile.damage *= multiplier;
                        projectile.critical = true;
                        ctx.events.push(GameEvent::CriticalHit {
                            unit_id: self.id,
                            pos: self.pos,
                        });
                    }
                    ctx.projectiles.push(projectile);
                }
                AttackStyle::Elemental => {
                    let element = self.next_element;
                    self.next_element = element.next();
                    let mut projectile =
                        self.projectile(ctx.ids, angle, ProjectileKind::Elemental(element));
                    projectile.color = element.color();
                    ctx.projectiles.push(projectile);
                }
            }
        }

        if let Some(rage) = profile.rage {
            self.vitals.heal(self.melee_damage * rage.lifesteal);
        }
        true
    }

    fn projectile(&self, ids: &mut EntityIds, angle: f64, kind: ProjectileKind) -> Projectile {
        Projectile::fire(
            ids.next_id(),
            self.pos,
            angle,
            self.projectile_speed,
            self.projectile_damage,
            self.color(),
            kind,
        )
    }

    fn shoot(&self, ctx: &mut AttackContext<'_>, angle: f64, kind: ProjectileKind) {
        let projectile = self.projectile(ctx.ids, angle, kind);
        ctx.projectiles.push(projectile);
    }
}
