//! Shared entity vitals
//!
//! Every combatant (units and monsters) carries a `Vitals` block. Health is
//! clamped to `[0, max]` and `dead` is exactly `health == 0`.

use serde::{Deserialize, Serialize};

/// Health bookkeeping shared by units and monsters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f64,
    pub max_health: f64,
    pub dead: bool,
}

impl Vitals {
    pub fn new(max_health: f64) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
            dead: max_health == 0.0,
        }
    }

    /// Apply damage. Non-positive and NaN amounts are ignored so that
    /// damage can never heal.
    ///
    /// Returns the health actually removed.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        if amount.is_nan() || amount <= 0.0 || self.dead {
            return 0.0;
        }
        let before = self.health;
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
        }
        before - self.health
    }

    /// Restore health, capped at max. Dead entities stay dead.
    pub fn heal(&mut self, amount: f64) {
        if amount.is_nan() || amount <= 0.0 || self.dead {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Kill outright (core breach, removal)
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.dead = true;
    }

    /// Health in `[0, 1]` for health bars
    pub fn fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Fraction of health missing, `[0, 1]`
    pub fn missing_fraction(&self) -> f64 {
        1.0 - self.fraction()
    }
}
