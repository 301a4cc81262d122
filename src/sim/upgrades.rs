//! Global unit upgrades
//!
//! Three independent tracks, each with a level, a compounding cost and a
//! per-level multiplier. Unit stats are always recomputed from base values
//! as `floor(base * multiplier^level)`, never from already-upgraded stats.

use serde::{Deserialize, Serialize};

/// Cost growth per purchase (compounding, floored each step)
pub const COST_GROWTH: f64 = 1.5;

/// Upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    AttackSpeed,
    Range,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [
        UpgradeKind::Damage,
        UpgradeKind::AttackSpeed,
        UpgradeKind::Range,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::AttackSpeed => "attack_speed",
            UpgradeKind::Range => "range",
        }
    }

    /// (starting cost, per-level multiplier)
    fn defaults(&self) -> (f64, f64) {
        match self {
            UpgradeKind::Damage => (150.0, 1.5),
            // Applied to the attack interval, so < 1 means faster attacks
            UpgradeKind::AttackSpeed => (120.0, 0.85),
            UpgradeKind::Range => (100.0, 1.15),
        }
    }
}

/// One upgrade track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTrack {
    pub level: u32,
    pub cost: f64,
    pub multiplier: f64,
}

impl UpgradeTrack {
    fn new(kind: UpgradeKind) -> Self {
        let (cost, multiplier) = kind.defaults();
        Self {
            level: 0,
            cost,
            multiplier,
        }
    }

    /// `floor(base * multiplier^level)`
    pub fn apply(&self, base: f64) -> f64 {
        apply_level(base, self.multiplier, self.level)
    }
}

/// `floor(base * multiplier^level)`
#[inline]
pub fn apply_level(base: f64, multiplier: f64, level: u32) -> f64 {
    (base * multiplier.powi(level as i32)).floor()
}

/// Snapshot of the three levels, carried by each unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub damage: u32,
    pub attack_speed: u32,
    pub range: u32,
}

/// Owner of the three upgrade tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeSystem {
    pub damage: UpgradeTrack,
    pub attack_speed: UpgradeTrack,
    pub range: UpgradeTrack,
}

impl Default for UpgradeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UpgradeSystem {
    pub fn new() -> Self {
        Self {
            damage: UpgradeTrack::new(UpgradeKind::Damage),
            attack_speed: UpgradeTrack::new(UpgradeKind::AttackSpeed),
            range: UpgradeTrack::new(UpgradeKind::Range),
        }
    }

    pub fn track(&self, kind: UpgradeKind) -> &UpgradeTrack {
        match kind {
            UpgradeKind::Damage => &self.damage,
            UpgradeKind::AttackSpeed => &self.attack_speed,
            UpgradeKind::Range => &self.range,
        }
    }

    fn track_mut(&mut self, kind: UpgradeKind) -> &mut UpgradeTrack {
        match kind {
            UpgradeKind::Damage => &mut self.damage,
            UpgradeKind::AttackSpeed => &mut self.attack_speed,
            UpgradeKind::Range => &mut self.range,
        }
    }

    pub fn cost(&self, kind: UpgradeKind) -> f64 {
        self.track(kind).cost
    }

    pub fn levels(&self) -> UpgradeLevels {
        UpgradeLevels {
            damage: self.damage.level,
            attack_speed: self.attack_speed.level,
            range: self.range.level,
        }
    }

    /// Raise the track one level and grow its cost.
    ///
    /// Funds are checked by the caller; returns the price paid.
    pub fn purchase(&mut self, kind: UpgradeKind) -> f64 {
        let track = self.track_mut(kind);
        let paid = track.cost;
        track.level += 1;
        track.cost = (track.cost * COST_GROWTH).floor();
        paid
    }
}
