//! Per-frame combat resolution
//!
//! Pure functions over the entity collections, run in a fixed order by
//! `tick`: melee contact, projectile impacts, reward attribution, then (after
//! pruning) core breaches. The first three passes run on the pre-prune lists.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::monster::{Monster, MonsterKind};
use super::particle::{
    COLOR_FROST, COLOR_HIT, COLOR_LIGHTNING, COLOR_REWARD, COLOR_SPLASH, COLOR_STRONG_KILL,
    ParticleField,
};
use super::projectile::{
    CHAIN_FALLOFF, Element, FROST_SLOW_FACTOR, FROST_SLOW_MS, Projectile, ProjectileKind,
    STORM_CHAIN_RADIUS, STORM_JUMPS,
};
use super::state::GameEvent;
use super::unit::Unit;
use crate::consts::{CORE_BREACH_RADIUS, MELEE_KNOCKBACK, SPLASH_EDGE_FRACTION};
use crate::distance;

/// Damage multiplier for a splash target `dist` pixels from the impact.
///
/// 1.0 at the center, `1 - SPLASH_EDGE_FRACTION` at the edge, linear between.
#[inline]
pub fn splash_multiplier(dist: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 1.0;
    }
    1.0 - (dist / radius) * SPLASH_EDGE_FRACTION
}

/// Body contact between units and monsters.
///
/// Both sides take damage every frame the overlap persists, and the monster
/// is pushed away from the unit (along +x when they share a position).
pub fn resolve_melee(units: &mut [Unit], monsters: &mut [Monster]) -> usize {
    let mut contacts = 0;
    for unit in units.iter_mut() {
        for monster in monsters.iter_mut() {
            if distance(unit.pos, monster.pos) < unit.size + monster.size {
                unit.take_damage(monster.damage);
                monster.take_damage(unit.melee_damage);
                let away = (monster.pos - unit.pos).try_normalize().unwrap_or(DVec2::X);
                monster.pos += away * MELEE_KNOCKBACK;
                contacts += 1;
            }
        }
    }
    contacts
}

/// Projectile hits. A projectile is spent on the first living monster it
/// overlaps; monsters killed earlier this frame do not absorb shots.
pub fn resolve_impacts(
    projectiles: &mut [Projectile],
    monsters: &mut [Monster],
    particles: &mut ParticleField,
) -> usize {
    let mut hits = 0;
    for projectile in projectiles.iter_mut().filter(|p| !p.dead) {
        let struck = monsters
            .iter()
            .position(|m| !m.is_dead() && distance(projectile.pos, m.pos) < projectile.size + m.size);
        if let Some(index) = struck {
            impact(projectile, index, monsters, particles);
            projectile.dead = true;
            hits += 1;
        }
    }
    hits
}

fn impact(
    projectile: &Projectile,
    struck: usize,
    monsters: &mut [Monster],
    particles: &mut ParticleField,
) {
    if let Some(radius) = projectile.kind.splash_radius() {
        splash(projectile.pos, projectile.damage, radius, monsters);
        particles.burst(projectile.pos, 20.0, COLOR_SPLASH, 400.0, 8);
        return;
    }

    match projectile.kind {
        ProjectileKind::ChainLightning { jumps, chain_radius } => {
            chain(struck, projectile.damage, jumps, chain_radius, monsters, particles);
        }
        ProjectileKind::Elemental(Element::Storm) => {
            chain(
                struck,
                projectile.damage,
                STORM_JUMPS,
                STORM_CHAIN_RADIUS,
                monsters,
                particles,
            );
        }
        ProjectileKind::Elemental(Element::Frost) => {
            let monster = &mut monsters[struck];
            monster.take_damage(projectile.damage);
            monster.apply_slow(FROST_SLOW_FACTOR, FROST_SLOW_MS);
            particles.emit(monster.pos, COLOR_FROST, 400.0);
        }
        _ => {
            let monster = &mut monsters[struck];
            monster.take_damage(projectile.damage);
            particles.emit(monster.pos, COLOR_HIT, 300.0);
        }
    }
}

/// Damage every monster within `radius` of `center`, with linear falloff
pub fn splash(center: DVec2, damage: f64, radius: f64, monsters: &mut [Monster]) -> usize {
    let mut hit = 0;
    for monster in monsters.iter_mut() {
        let d = distance(center, monster.pos);
        if d <= radius {
            monster.take_damage(damage * splash_multiplier(d, radius));
            hit += 1;
        }
    }
    hit
}

/// Full damage to `first`, then up to `jumps` arcs to the nearest living,
/// not-yet-struck monster within `radius` of the previous target. Damage
/// falls off by `CHAIN_FALLOFF` per arc.
pub fn chain(
    first: usize,
    damage: f64,
    jumps: u32,
    radius: f64,
    monsters: &mut [Monster],
    particles: &mut ParticleField,
) -> Vec<usize> {
    let mut struck = vec![first];
    let mut damage = damage;
    monsters[first].take_damage(damage);
    particles.emit(monsters[first].pos, COLOR_LIGHTNING, 300.0);

    let mut from = monsters[first].pos;
    for _ in 0..jumps {
        let mut next: Option<(usize, f64)> = None;
        for (i, monster) in monsters.iter().enumerate() {
            if monster.is_dead() || struck.contains(&i) {
                continue;
            }
            let d = distance(from, monster.pos);
            if d <= radius && next.is_none_or(|(_, best)| d < best) {
                next = Some((i, d));
            }
        }
        let Some((index, _)) = next else {
            break;
        };
        damage *= CHAIN_FALLOFF;
        monsters[index].take_damage(damage);
        particles.emit(monsters[index].pos, COLOR_LIGHTNING, 300.0);
        from = monsters[index].pos;
        struck.push(index);
    }
    struck
}

/// Credit rewards for monsters that died this frame. Each monster pays out
/// exactly once.
pub fn award_rewards(
    monsters: &mut [Monster],
    particles: &mut ParticleField,
    events: &mut Vec<GameEvent>,
) -> f64 {
    let mut earned = 0.0;
    for monster in monsters.iter_mut() {
        if monster.vitals.health > 0.0 || monster.reward_given {
            continue;
        }
        monster.reward_given = true;
        earned += monster.reward;

        particles.emit(monster.pos, COLOR_REWARD, 500.0);
        if monster.kind == MonsterKind::Strong {
            particles.burst(monster.pos, 20.0, COLOR_STRONG_KILL, 600.0, 5);
        }
        events.push(GameEvent::MonsterKilled {
            monster_id: monster.id,
            kind: monster.kind,
            reward: monster.reward,
            pos: monster.pos,
        });
    }
    earned
}

/// Monsters that reach the core each take one random unit with them and
/// vanish without paying out. With no units left there is nothing to take
/// and the monster stays.
pub fn resolve_breaches(
    monsters: &mut [Monster],
    units: &mut Vec<Unit>,
    core: DVec2,
    rng: &mut Pcg32,
    particles: &mut ParticleField,
    events: &mut Vec<GameEvent>,
) -> usize {
    let mut breaches = 0;
    for monster in monsters.iter_mut() {
        if monster.is_dead() || distance(monster.pos, core) >= CORE_BREACH_RADIUS {
            continue;
        }
        if units.is_empty() {
            continue;
        }
        let index = rng.random_range(0..units.len());
        let lost = units.remove(index);

        monster.vitals.kill();
        monster.reward_given = true;

        particles.burst(core, 40.0, COLOR_HIT, 800.0, 10);
        events.push(GameEvent::CoreBreached {
            monster_id: monster.id,
            unit_id: lost.id,
        });
        log::debug!("Core breached by monster {}, lost unit {}", monster.id, lost.id);
        breaches += 1;
    }
    breaches
}
