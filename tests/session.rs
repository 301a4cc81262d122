//! Session scenarios driven through the public API

use core_siege::Settings;
use core_siege::platform::{InputSource, ScriptedInput};
use core_siege::renderer::{FrameSnapshot, JsonLinesRenderer, Renderer};
use core_siege::sim::{
    Command, CommandError, GameEvent, GamePhase, GameSession, Monster, MonsterKind, Projectile,
    ProjectileKind, UnitKind, UpgradeKind, tick,
};
use glam::DVec2;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn run_for(session: &mut GameSession, ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut elapsed = 0.0;
    while elapsed < ms {
        tick(session, FRAME_MS);
        events.extend(session.drain_events());
        elapsed += FRAME_MS;
    }
    events
}

fn place(session: &mut GameSession, kind: UnitKind, x: f64, y: f64) {
    session.apply(Command::PlaceUnit { kind }).unwrap();
    session.apply(Command::ConfirmPlacement { x, y }).unwrap();
}

fn inner_ring(session: &mut GameSession) {
    place(session, UnitKind::Ranger, 400.0, 360.0);
    place(session, UnitKind::Ranger, 400.0, 240.0);
    place(session, UnitKind::Wizard, 340.0, 300.0);
}

#[test]
fn rewards_account_for_every_coin() {
    let mut session = GameSession::new(Settings::default());
    inner_ring(&mut session);
    assert_eq!(session.money, 0.0);

    let events = run_for(&mut session, 60_000.0);
    let kills: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::MonsterKilled { reward, .. } => Some(*reward),
            _ => None,
        })
        .collect();

    assert!(!kills.is_empty(), "no monster died in a minute");
    let earned: f64 = kills.iter().sum();
    assert!((session.money - earned).abs() < 1e-6);
}

#[test]
fn waves_advance_on_the_clock() {
    // A ring this dense stops every monster long before it reaches the core,
    // and there are more units than spawns in the first 31 s
    let mut session = GameSession::new(Settings {
        starting_warriors: 40,
        ..Settings::default()
    });
    let events = run_for(&mut session, 31_000.0);

    assert_eq!(session.phase, GamePhase::Playing);
    assert_eq!(session.wave(), 2);
    assert!(events.contains(&GameEvent::WaveAdvanced { wave: 2 }));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::WaveAdvanced { wave: 3 })));
}

#[test]
fn simultaneous_hits_pay_one_reward() {
    let mut session = GameSession::new(Settings::default());
    // Second warrior just below the garrison warrior at (480, 300)
    place(&mut session, UnitKind::Warrior, 480.0, 330.0);
    session.drain_events();
    assert_eq!(session.money, 200.0);

    // Two warriors (25 each) and a bolt (20) all land this frame
    let pos = DVec2::new(480.0, 315.0);
    let mut monster = Monster::spawn(999, MonsterKind::Basic, pos, 1, 0);
    monster.vitals.health = 60.0;
    let reward = monster.reward;
    session.monsters.push(monster);
    session
        .projectiles
        .push(Projectile::fire(998, pos, 0.0, 0.0, 20.0, 0, ProjectileKind::Bolt));

    tick(&mut session, FRAME_MS);
    let events = session.drain_events();

    let kills = events
        .iter()
        .filter(|e| matches!(e, GameEvent::MonsterKilled { monster_id: 999, .. }))
        .count();
    assert_eq!(kills, 1);
    assert_eq!(session.money, 200.0 + reward);
    assert!(session.monsters.iter().all(|m| m.id != 999));
    assert!(session.projectiles.is_empty());

    tick(&mut session, FRAME_MS);
    assert_eq!(session.money, 200.0 + reward);
}

#[test]
fn evolution_keeps_position_and_upgrades() {
    let mut session = GameSession::new(Settings {
        starting_money: 1000.0,
        ..Settings::default()
    });
    session
        .apply(Command::BuyUpgrade {
            kind: UpgradeKind::Damage,
        })
        .unwrap();

    let warrior = session.units[2].clone();
    session
        .apply(Command::SelectUnitAt {
            x: warrior.pos.x,
            y: warrior.pos.y,
        })
        .unwrap();
    session
        .apply(Command::Evolve {
            path: "Guardian".into(),
        })
        .unwrap();

    let guardian = &session.units[2];
    assert_eq!(guardian.id, warrior.id);
    assert_eq!(guardian.pos, warrior.pos);
    assert_eq!(guardian.kind, UnitKind::Guardian);
    assert_eq!(guardian.levels, warrior.levels);
    // Guardian base 30, one damage level
    assert_eq!(guardian.melee_damage, 45.0);
    assert_eq!(guardian.vitals.max_health, 300.0);
    assert_eq!(session.money, 1000.0 - 150.0 - 200.0);

    assert_eq!(
        session.apply(Command::Evolve {
            path: "Berserker".into()
        }),
        Err(CommandError::NotEvolvable)
    );
    assert!(
        session
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::UnitEvolved { to: UnitKind::Guardian, .. }))
    );
}

#[test]
fn upgrades_reach_units_placed_later() {
    let mut session = GameSession::new(Settings::default());
    session
        .apply(Command::BuyUpgrade {
            kind: UpgradeKind::Range,
        })
        .unwrap();
    place(&mut session, UnitKind::Ranger, 400.0, 380.0);
    let ranger = session.units.last().unwrap();
    // floor(120 * 1.15)
    assert_eq!(ranger.range, 138.0);
    assert_eq!(session.money, 75.0);
}

#[test]
fn rejected_commands_leave_state_untouched() {
    let mut session = GameSession::new(Settings {
        starting_money: 40.0,
        ..Settings::default()
    });
    let before = FrameSnapshot::capture(&session, Vec::new());

    assert!(session.apply(Command::PlaceUnit { kind: UnitKind::Warrior }).is_err());
    assert!(session.apply(Command::BuyUpgrade { kind: UpgradeKind::Range }).is_err());
    assert!(session.apply(Command::ConfirmPlacement { x: 100.0, y: 100.0 }).is_err());
    assert!(session.apply(Command::Evolve { path: "Guardian".into() }).is_err());

    let after = FrameSnapshot::capture(&session, Vec::new());
    assert_eq!(before, after);
}

#[test]
fn pause_freezes_and_restart_resets() {
    let mut session = GameSession::new(Settings::default());
    run_for(&mut session, 5_000.0);
    session.apply(Command::TogglePause).unwrap();

    let frozen: Vec<DVec2> = session.monsters.iter().map(|m| m.pos).collect();
    let time = session.time_ms();
    run_for(&mut session, 5_000.0);
    assert_eq!(session.time_ms(), time);
    assert_eq!(frozen, session.monsters.iter().map(|m| m.pos).collect::<Vec<_>>());

    assert_eq!(
        session.apply(Command::BuyUpgrade {
            kind: UpgradeKind::Damage
        }),
        Err(CommandError::NotPlaying)
    );

    session.apply(Command::Restart).unwrap();
    assert_eq!(session.phase, GamePhase::Playing);
    assert_eq!(session.time_ms(), 0.0);
    assert!(session.monsters.is_empty());
    assert_eq!(session.money, 250.0);
}

#[test]
fn no_units_means_game_over() {
    let mut session = GameSession::new(Settings {
        starting_warriors: 0,
        ..Settings::default()
    });
    tick(&mut session, FRAME_MS);
    assert_eq!(session.phase, GamePhase::GameOver);
    assert_eq!(
        session.apply(Command::PlaceUnit {
            kind: UnitKind::Warrior
        }),
        Err(CommandError::NotPlaying)
    );
}

#[test]
fn late_game_enters_hp_phases() {
    let mut session = GameSession::new(Settings::default());
    session.waves.wave = 40;
    session.waves.elapsed_ms = 39.0 * 30_000.0;
    let events = run_for(&mut session, 200.0);
    assert!(session.hp_phase() >= 1);
    assert!(events.contains(&GameEvent::HpPhaseIncreased { phase: 1 }));
}

#[test]
fn same_seed_same_run_different_seed_different_run() {
    let run = |seed: u64, ms: f64| {
        let mut session = GameSession::new(Settings {
            seed,
            ..Settings::default()
        });
        inner_ring(&mut session);
        run_for(&mut session, ms);
        (
            session.money,
            session.units.len(),
            session.monsters.iter().map(|m| m.pos).collect::<Vec<_>>(),
        )
    };
    assert_eq!(run(7, 20_000.0), run(7, 20_000.0));

    // One monster on the field, still far from any defender
    let (_, _, a) = run(7, 3_000.0);
    let (_, _, b) = run(8, 3_000.0);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_ne!(a, b);
}

#[test]
fn scripted_run_renders_json_lines() {
    let script = r#"[
        {"at_ms": 0, "command": "place_unit", "kind": "Wizard"},
        {"at_ms": 0, "command": "pointer_moved", "x": 400, "y": 380},
        {"at_ms": 100, "command": "confirm_placement", "x": 400, "y": 380},
        {"at_ms": 200, "command": "toggle_speed"}
    ]"#;
    let mut input = ScriptedInput::from_json_str(script).unwrap();
    let mut session = GameSession::new(Settings::default());
    let mut renderer = JsonLinesRenderer::new(Vec::new()).with_stride(30);

    let mut now = 0.0;
    while now < 1_000.0 {
        for command in input.poll(now) {
            session.apply(command).unwrap();
        }
        tick(&mut session, FRAME_MS);
        let events = session.drain_events();
        renderer.draw(&FrameSnapshot::capture(&session, events)).unwrap();
        now += FRAME_MS;
    }
    renderer.finish().unwrap();

    assert!(input.is_exhausted());
    assert_eq!(session.units.len(), 4);
    assert_eq!(session.speed.factor(), 2.0);

    let out = String::from_utf8(renderer.into_inner()).unwrap();
    let first: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
    assert_eq!(first["placement"]["valid"], true);
    assert!(out.contains(r#""event":"unit_placed""#));
}
