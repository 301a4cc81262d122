//! Per-frame simulation pipeline and command application
//!
//! `tick` advances the session by one variable-length frame. Commands are
//! applied between frames through `GameSession::apply`.

use glam::DVec2;

use super::combat::{award_rewards, resolve_breaches, resolve_impacts, resolve_melee};
use super::command::{Command, CommandError, PlacementError};
use super::monster::Monster;
use super::state::{GameEvent, GamePhase, GameSession, PlacementPending};
use super::unit::{AttackContext, Unit, UnitKind};
use super::upgrades::UpgradeKind;
use crate::consts::*;
use crate::distance;

/// Advance the session by `dt` wall-clock milliseconds
pub fn tick(session: &mut GameSession, dt: f64) {
    // Don't tick if paused or game over
    if !session.is_playing() {
        return;
    }

    let mut dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    if let Some(max_dt) = session.settings.max_frame_dt_ms {
        dt = dt.min(max_dt);
    }
    let dt = dt * session.speed.factor();
    session.frame += 1;

    spawn(session, dt);
    update_entities(session, dt);

    resolve_melee(&mut session.units, &mut session.monsters);
    resolve_impacts(
        &mut session.projectiles,
        &mut session.monsters,
        &mut session.particles,
    );
    session.money += award_rewards(
        &mut session.monsters,
        &mut session.particles,
        &mut session.events,
    );

    prune(session);

    if session.waves.check_wave_advance() {
        let wave = session.waves.wave;
        log::info!(
            "Wave {} begins (spawn every {:.0} ms)",
            wave,
            session.waves.spawn_rate()
        );
        session.events.push(GameEvent::WaveAdvanced { wave });
    }

    resolve_breaches(
        &mut session.monsters,
        &mut session.units,
        session.core,
        &mut session.rng,
        &mut session.particles,
        &mut session.events,
    );
    session.monsters.retain(|m| !m.is_dead());
    session.resolve_selection();

    if session.units.is_empty() {
        end_run(session);
    }

    log::trace!(
        "frame {}: units={} monsters={} projectiles={} particles={}",
        session.frame,
        session.units.len(),
        session.monsters.len(),
        session.projectiles.len(),
        session.particles.len()
    );
}

fn spawn(session: &mut GameSession, dt: f64) {
    let update = session
        .waves
        .update(dt, &mut session.rng, session.bounds);

    if update.phase_increased {
        let phase = session.waves.hp_phase;
        log::info!("HP scaling phase {} at wave {}", phase, session.waves.wave);
        session.events.push(GameEvent::HpPhaseIncreased { phase });
    }

    if let Some(request) = update.spawn {
        let id = session.ids.next_id();
        session.monsters.push(Monster::spawn(
            id,
            request.kind,
            request.pos,
            session.waves.wave,
            session.waves.hp_phase,
        ));
    }
}

fn update_entities(session: &mut GameSession, dt: f64) {
    for unit in session.units.iter_mut() {
        let mut ctx = AttackContext {
            monsters: &mut session.monsters,
            projectiles: &mut session.projectiles,
            ids: &mut session.ids,
            rng: &mut session.rng,
            events: &mut session.events,
        };
        unit.update(dt, &mut ctx);
    }

    let core = session.core;
    for monster in session.monsters.iter_mut().filter(|m| !m.is_dead()) {
        monster.update(dt, core);
    }

    let bounds = session.bounds;
    for projectile in session.projectiles.iter_mut() {
        projectile.update(dt, bounds);
    }

    session.particles.update(dt);
}

fn prune(session: &mut GameSession) {
    session.units.retain(|u| !u.is_dead());
    session.monsters.retain(|m| !m.is_dead());
    session.projectiles.retain(|p| !p.dead);
    session.particles.prune();
}

fn end_run(session: &mut GameSession) {
    session.phase = GamePhase::GameOver;
    session.placement = None;
    session.selected = None;
    let wave = session.waves.wave;
    let time_ms = session.time_ms();
    log::info!("Game over at wave {} after {:.1}s", wave, time_ms / 1000.0);
    session.events.push(GameEvent::GameOver { wave, time_ms });
}

impl GameSession {
    /// Apply one player command. A rejected command leaves the session
    /// untouched.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        let result = self.dispatch(&command);
        if let Err(err) = &result {
            log::debug!("Rejected {:?}: {}", command, err);
        }
        result
    }

    fn dispatch(&mut self, command: &Command) -> Result<(), CommandError> {
        if !self.is_playing() && !command.allowed_when_not_playing() {
            return Err(CommandError::NotPlaying);
        }

        match *command {
            Command::PlaceUnit { kind } => self.begin_placement(kind),
            Command::ConfirmPlacement { x, y } => self.confirm_placement(DVec2::new(x, y)),
            Command::CancelPlacement => {
                self.placement = None;
                Ok(())
            }
            Command::BuyUpgrade { kind } => self.buy_upgrade(kind),
            Command::SelectUnitAt { x, y } => {
                self.selected = self.unit_at(DVec2::new(x, y)).map(|u| u.id);
                Ok(())
            }
            Command::Evolve { ref path } => self.evolve_selected(path),
            Command::TogglePause => {
                self.phase = match self.phase {
                    GamePhase::Playing => GamePhase::Paused,
                    GamePhase::Paused => GamePhase::Playing,
                    GamePhase::GameOver => GamePhase::GameOver,
                };
                Ok(())
            }
            Command::ToggleSpeed => {
                self.speed = self.speed.next();
                Ok(())
            }
            Command::Restart => {
                self.restart();
                log::info!("Session restarted");
                Ok(())
            }
            Command::PointerMoved { x, y } => {
                self.cursor = DVec2::new(x, y);
                Ok(())
            }
        }
    }

    fn require_funds(&self, cost: f64) -> Result<(), CommandError> {
        if self.can_afford(cost) {
            Ok(())
        } else {
            Err(CommandError::InsufficientFunds {
                needed: cost,
                available: self.money,
            })
        }
    }

    fn begin_placement(&mut self, kind: UnitKind) -> Result<(), CommandError> {
        let cost = kind.cost().ok_or(CommandError::NotForSale(kind))?;
        self.require_funds(cost)?;
        self.placement = Some(PlacementPending { kind, cost });
        Ok(())
    }

    fn confirm_placement(&mut self, pos: DVec2) -> Result<(), CommandError> {
        let pending = self.placement.ok_or(CommandError::NoPlacementPending)?;
        self.require_funds(pending.cost)?;
        self.validate_placement(pos)?;

        self.money -= pending.cost;
        let id = self.ids.next_id();
        self.units
            .push(Unit::with_upgrades(id, pending.kind, pos, &self.upgrades));
        self.placement = None;

        log::debug!("Placed {} {} at ({:.0}, {:.0})", pending.kind, id, pos.x, pos.y);
        self.events.push(GameEvent::UnitPlaced {
            unit_id: id,
            kind: pending.kind,
            pos,
        });
        Ok(())
    }

    /// Check a placement position against the core, existing units and the
    /// play-area margin
    pub fn validate_placement(&self, pos: DVec2) -> Result<(), PlacementError> {
        if distance(pos, self.core) < MIN_PLACEMENT_DISTANCE_FROM_CORE {
            return Err(PlacementError::TooCloseToCore);
        }
        if self
            .units
            .iter()
            .any(|u| distance(pos, u.pos) < MIN_PLACEMENT_DISTANCE_BETWEEN_UNITS)
        {
            return Err(PlacementError::TooCloseToUnit);
        }
        let margin = PLACEMENT_MARGIN;
        if pos.x < margin
            || pos.x > self.bounds.x - margin
            || pos.y < margin
            || pos.y > self.bounds.y - margin
        {
            return Err(PlacementError::OutOfBounds);
        }
        Ok(())
    }

    fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<(), CommandError> {
        self.require_funds(self.upgrades.cost(kind))?;

        let paid = self.upgrades.purchase(kind);
        self.money -= paid;
        for unit in self.units.iter_mut() {
            unit.apply_upgrades(&self.upgrades);
        }

        let level = self.upgrades.track(kind).level;
        log::debug!("Upgraded {} to level {} for {}", kind.as_str(), level, paid);
        self.events.push(GameEvent::UpgradePurchased {
            kind,
            level,
            cost: paid,
        });
        Ok(())
    }

    /// Nearest unit whose square hit box contains `pos`
    pub fn unit_at(&self, pos: DVec2) -> Option<&Unit> {
        self.units
            .iter()
            .filter(|u| (pos.x - u.pos.x).abs() <= u.size && (pos.y - u.pos.y).abs() <= u.size)
            .min_by(|a, b| distance(pos, a.pos).total_cmp(&distance(pos, b.pos)))
    }

    fn evolve_selected(&mut self, path_name: &str) -> Result<(), CommandError> {
        let unit = self.selected_unit().ok_or(CommandError::NoSelection)?;
        if !unit.can_evolve || unit.evolved {
            return Err(CommandError::NotEvolvable);
        }
        let path = unit
            .evolution_paths()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(path_name))
            .ok_or_else(|| CommandError::UnknownEvolutionPath(path_name.to_string()))?;
        self.require_funds(path.cost)?;

        let (id, from, pos) = (unit.id, unit.kind, unit.pos);
        let Some(slot) = self.units.iter().position(|u| u.id == id) else {
            return Err(CommandError::NoSelection);
        };

        self.money -= path.cost;
        self.units[slot] = Unit::with_upgrades(id, path.target, pos, &self.upgrades);

        log::info!("Unit {} evolved: {} -> {}", id, from, path.target);
        self.events.push(GameEvent::UnitEvolved {
            unit_id: id,
            from,
            to: path.target,
        });
        Ok(())
    }
}
