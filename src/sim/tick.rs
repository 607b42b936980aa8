//! Fixed timestep simulation tick
//!
//! `tick` consumes host frame time through an accumulator and runs whole
//! simulation steps; `step` is the core loop that advances one of them.

use glam::Vec2;

use super::collision::{
    player_vs_enemies, player_vs_pickups, projectiles_vs_enemies, rebuild_grid, spawn_drops,
};
use super::entity::sweep;
use super::state::{Arena, GameEvent, GamePhase, Snapshot};
use crate::consts::*;
use crate::distance;

/// Distance at which the autopilot starts running from an enemy
const AUTOPILOT_DANGER_RADIUS: f32 = 150.0;
/// Pull toward the arena center while fleeing, so the autopilot doesn't pin itself to a wall
const AUTOPILOT_CENTER_PULL: f32 = 0.3;

/// Input commands for one host frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (need not be normalized)
    pub direction: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode: the simulation steers the player itself
    pub autopilot: bool,
}

/// Advance the arena by `dt_ms` of host frame time
pub fn tick(arena: &mut Arena, input: &TickInput, dt_ms: f64) -> Snapshot {
    if input.pause {
        arena.toggle_pause();
    }

    if arena.phase != GamePhase::Playing {
        return arena.snapshot();
    }

    arena.player.direction = if input.autopilot {
        autopilot(arena)
    } else {
        input.direction
    };

    // A stalled tab must not trigger a burst of catch-up steps
    let dt_ms = if dt_ms.is_finite() { dt_ms.clamp(0.0, MAX_FRAME_MS) } else { 0.0 };
    arena.accumulator_ms += dt_ms;

    let mut substeps = 0;
    while arena.accumulator_ms >= STEP_MS && substeps < MAX_SUBSTEPS {
        step(arena);
        arena.accumulator_ms -= STEP_MS;
        substeps += 1;

        if arena.phase != GamePhase::Playing {
            arena.accumulator_ms = 0.0;
            break;
        }
    }
    if substeps == MAX_SUBSTEPS {
        arena.accumulator_ms = 0.0;
    }

    arena.snapshot()
}

/// Advance the simulation by exactly one fixed step
pub fn step(arena: &mut Arena) {
    arena.elapsed_ms += STEP_MS;
    let now = arena.elapsed_ms;
    let secs = arena.elapsed_secs();
    let bounds = arena.bounds;

    // Movement and firing
    arena.player.update(STEP_SECS, bounds);

    let origin = arena.player.pos;
    for weapon in &mut arena.weapons {
        let volley = weapon.try_fire(
            now,
            origin,
            &arena.player.modifiers,
            &arena.enemies,
            &arena.tuning.combat,
        );
        arena.projectiles.extend(volley);
    }
    for proj in &mut arena.projectiles {
        proj.update(STEP_SECS, bounds);
    }

    // Spawning
    let spawned = arena.director.update(
        secs,
        &arena.tuning.director,
        &arena.tuning.enemies,
        bounds,
        &mut arena.rng,
        &mut arena.next_id,
    );
    arena.enemies.extend(spawned);

    let decay = arena.tuning.combat.knockback_decay;
    for enemy in &mut arena.enemies {
        enemy.update(origin, STEP_SECS, decay);
    }

    let magnet = arena.magnet_range();
    let accel = arena.tuning.combat.pickup_accel;
    for pickup in &mut arena.pickups {
        pickup.update(origin, magnet, accel, STEP_SECS);
    }

    // Collisions
    rebuild_grid(&mut arena.grid, &arena.enemies);

    let mut kills = Vec::new();
    projectiles_vs_enemies(
        &arena.grid,
        &mut arena.projectiles,
        &mut arena.enemies,
        arena.player.modifiers.damage,
        &arena.tuning.combat,
        &mut kills,
        &mut arena.events,
    );
    let died = player_vs_enemies(
        &arena.grid,
        &mut arena.player,
        &arena.enemies,
        now,
        &mut arena.events,
    );
    let haul = player_vs_pickups(&mut arena.player, &mut arena.pickups, &mut arena.events);

    arena.kills += kills.len() as u32;
    arena.gold_earned += haul.gold;
    if haul.levels > 0 {
        arena.pending_level_ups += haul.levels;
        arena.events.push(GameEvent::LevelUp {
            level: arena.player.level,
        });
    }

    // Drops join the world only after this step's collisions
    let drops = spawn_drops(&kills, &arena.tuning.combat, &mut arena.rng);
    sweep(&mut arena.enemies);
    sweep(&mut arena.projectiles);
    sweep(&mut arena.pickups);
    arena.pickups.extend(drops);

    // Outcome
    if died {
        end_run(arena, false);
    } else if arena.director.is_finished() {
        end_run(arena, true);
    } else if arena.pending_level_ups > 0 {
        arena.open_level_up();
    }
}

fn end_run(arena: &mut Arena, won: bool) {
    arena.phase = GamePhase::GameOver;
    arena.won = won;
    arena.enemies.clear();
    arena.projectiles.clear();
    arena.pickups.clear();
    arena.pending_level_ups = 0;
    arena.events.push(GameEvent::RunEnded { won });
    log::info!(
        "Run {} at {:.1}s: level={} kills={} gold={}",
        if won { "won" } else { "lost" },
        arena.elapsed_secs(),
        arena.player.level,
        arena.kills,
        arena.gold_earned
    );
}

/// Demo-mode steering: flee nearby enemies, otherwise collect pickups,
/// otherwise drift back to the center
pub fn autopilot(arena: &Arena) -> Vec2 {
    let pos = arena.player.pos;
    let center = arena.bounds.center();

    let mut flee = Vec2::ZERO;
    for enemy in arena.enemies.iter().filter(|e| e.life.is_alive()) {
        let away = pos - enemy.pos;
        let dist = away.length();
        if dist > 0.0 && dist < AUTOPILOT_DANGER_RADIUS {
            // Closer enemies push harder
            flee += away / (dist * dist);
        }
    }
    if flee != Vec2::ZERO {
        let pull = (center - pos).normalize_or_zero() * AUTOPILOT_CENTER_PULL;
        return (flee.normalize_or_zero() + pull).normalize_or_zero();
    }

    let nearest_pickup = arena
        .pickups
        .iter()
        .filter(|p| p.life.is_alive())
        .min_by(|a, b| distance(pos, a.pos).total_cmp(&distance(pos, b.pos)));
    if let Some(pickup) = nearest_pickup {
        return (pickup.pos - pos).normalize_or_zero();
    }

    if distance(pos, center) > arena.player.radius {
        return (center - pos).normalize_or_zero();
    }
    Vec2::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::pickup::{Pickup, PickupKind};
    use crate::{MetaProgress, Tuning};

    fn arena_with(tuning: Tuning) -> Arena {
        let mut arena = Arena::new(12345, tuning);
        arena.start_run(&MetaProgress::default());
        arena
    }

    fn arena() -> Arena {
        arena_with(Tuning::default())
    }

    fn basic_enemy(arena: &mut Arena, pos: Vec2) -> Enemy {
        let id = arena.next_entity_id();
        Enemy::spawn(id, EnemyKind::Basic, &arena.tuning.enemies.basic, pos, 1.0)
    }

    fn one_step(arena: &mut Arena) -> Snapshot {
        tick(arena, &TickInput::default(), STEP_MS)
    }

    #[test]
    fn test_single_frame_single_step() {
        let mut a = arena();
        one_step(&mut a);
        assert_eq!(a.elapsed_ms, STEP_MS);
        assert_eq!(a.director.elapsed_steps, 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut a = arena();
        tick(&mut a, &TickInput::default(), 5_000.0);
        // At most 100 ms of simulated time, never a 5 second burst
        assert!(a.elapsed_ms <= MAX_FRAME_MS + 1e-9);
        assert!(a.elapsed_ms >= 5.0 * STEP_MS);
    }

    #[test]
    fn test_non_finite_frame_is_ignored() {
        let mut a = arena();
        tick(&mut a, &TickInput::default(), f64::NAN);
        tick(&mut a, &TickInput::default(), f64::INFINITY);
        assert_eq!(a.elapsed_ms, 0.0);

        // The run keeps stepping afterwards
        tick(&mut a, &TickInput::default(), STEP_MS);
        assert!(a.elapsed_ms > 0.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut a = arena();
        one_step(&mut a);
        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut a, &toggle, STEP_MS);
        assert_eq!(a.phase, GamePhase::Paused);
        let frozen = a.elapsed_ms;
        for _ in 0..10 {
            one_step(&mut a);
        }
        assert_eq!(a.elapsed_ms, frozen);

        // Unpause
        tick(&mut a, &toggle, STEP_MS);
        assert_eq!(a.phase, GamePhase::Playing);
        assert!(a.elapsed_ms > frozen);
    }

    #[test]
    fn test_pickup_magnet_uses_attack_zone() {
        let mut a = arena();
        let pos = a.player.pos + Vec2::new(200.0, 0.0);
        a.pickups.push(Pickup::new(PickupKind::Xp, pos, 5));
        one_step(&mut a);
        // Outside the 100 px pickup range but inside the 220 px blaster range
        assert!(a.pickups[0].magnetized);
        assert!(a.pickups[0].pos.x < pos.x);
    }

    #[test]
    fn test_pickup_outside_magnet_stays_put() {
        let mut a = arena();
        let pos = a.player.pos + Vec2::new(300.0, 0.0);
        a.pickups.push(Pickup::new(PickupKind::Xp, pos, 5));
        one_step(&mut a);
        assert!(!a.pickups[0].magnetized);
        assert_eq!(a.pickups[0].pos, pos);
    }

    #[test]
    fn test_kill_drop_not_collected_same_step() {
        let mut a = arena();
        let pos = a.player.pos + Vec2::new(20.0, 0.0);
        let mut enemy = basic_enemy(&mut a, pos);
        enemy.hp = 5.0;
        a.enemies.push(enemy);

        one_step(&mut a);
        assert_eq!(a.kills, 1);
        assert!(a.enemies.is_empty());
        assert!(a.pickups.iter().any(|p| p.kind == PickupKind::Xp));
        assert_eq!(a.player.xp, 0);
        // The enemy died before it could touch the player
        assert_eq!(a.player.hp, a.player.stats.max_hp);

        one_step(&mut a);
        assert_eq!(a.player.xp, 10);
    }

    #[test]
    fn test_second_hit_drops_one_xp_pickup() {
        let mut a = arena();
        let pos = a.player.pos + Vec2::new(60.0, 0.0);
        let enemy = basic_enemy(&mut a, pos);
        a.enemies.push(enemy);

        // First hit: 15 -> 5, bullet spent, nothing dropped
        let mut steps = 0;
        while a.enemies[0].hp == 15.0 {
            one_step(&mut a);
            steps += 1;
            assert!(steps < 10);
        }
        assert_eq!(a.enemies[0].hp, 5.0);
        assert!(a.projectiles.is_empty());
        assert!(a.pickups.is_empty());

        // Skip the cooldown and land the second hit
        a.weapons[0].last_fired_ms = None;
        while !a.enemies.is_empty() {
            one_step(&mut a);
            steps += 1;
            assert!(steps < 20);
        }
        assert_eq!(a.kills, 1);
        let xp: Vec<_> = a
            .pickups
            .iter()
            .filter(|p| p.kind == PickupKind::Xp)
            .collect();
        assert_eq!(xp.len(), 1);
        assert_eq!(xp[0].value, 10);
        assert!(a.pickups.len() <= 2);
    }

    #[test]
    fn test_contact_damage_and_death() {
        let mut a = arena();
        a.weapons.clear();
        a.player.hp = 5.0;
        let pos = a.player.pos;
        let enemy = basic_enemy(&mut a, pos);
        a.enemies.push(enemy);

        let snap = one_step(&mut a);
        assert_eq!(snap.phase, GamePhase::GameOver);
        assert_eq!(snap.hp, 0.0);
        let outcome = a.outcome();
        assert!(outcome.ended);
        assert!(!outcome.won);

        let events = a.drain_events();
        assert!(events.contains(&GameEvent::PlayerDied));
        assert!(events.contains(&GameEvent::RunEnded { won: false }));
        assert!(a.enemies.is_empty());

        // A finished run no longer advances
        let elapsed = a.elapsed_ms;
        one_step(&mut a);
        assert_eq!(a.elapsed_ms, elapsed);
    }

    #[test]
    fn test_survival_wins() {
        let mut tuning = Tuning::default();
        tuning.director.win_secs = 1.0;
        let mut a = arena_with(tuning);
        for _ in 0..120 {
            one_step(&mut a);
        }
        let outcome = a.outcome();
        assert!(outcome.ended);
        assert!(outcome.won);
        assert!(outcome.elapsed_seconds >= 1.0);
        assert!(outcome.elapsed_seconds < 1.1);
    }

    #[test]
    fn test_level_up_suspends_play() {
        let mut a = arena();
        let pos = a.player.pos;
        a.pickups.push(Pickup::new(PickupKind::Xp, pos, 30));

        one_step(&mut a);
        assert_eq!(a.phase, GamePhase::LevelUp);
        assert_eq!(a.player.level, 2);
        let offers = a.level_up_offers().unwrap().to_vec();
        assert!(!offers.is_empty());

        let elapsed = a.elapsed_ms;
        one_step(&mut a);
        assert_eq!(a.elapsed_ms, elapsed);

        assert!(a.choose_upgrade(&offers[0]));
        one_step(&mut a);
        assert!(a.elapsed_ms > elapsed);
    }

    #[test]
    fn test_gold_counts_toward_run() {
        let mut a = arena();
        let pos = a.player.pos;
        a.pickups.push(Pickup::new(PickupKind::Gold, pos, 10));
        a.pickups.push(Pickup::new(PickupKind::Gold, pos, 10));
        let snap = one_step(&mut a);
        assert_eq!(snap.gold_earned, 20);
        assert!(a.pickups.is_empty());
    }

    #[test]
    fn test_autopilot_flees() {
        let mut a = arena();
        let pos = a.player.pos + Vec2::new(60.0, 0.0);
        let enemy = basic_enemy(&mut a, pos);
        a.enemies.push(enemy);
        let dir = autopilot(&a);
        assert!(dir.x < 0.0);
    }

    #[test]
    fn test_autopilot_survives_a_while() {
        let mut a = arena();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(60 * 30) {
            tick(&mut a, &input, STEP_MS);
            if let Some(offers) = a.level_up_offers() {
                let first = offers[0];
                a.choose_upgrade(&first);
            }
        }
        assert!(a.kills > 0);
        assert!(a.elapsed_secs() > 20.0);
    }

    #[test]
    fn test_determinism() {
        // Two arenas with the same seed produce identical runs
        let mut a1 = arena();
        let mut a2 = arena();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..1200 {
            let s1 = tick(&mut a1, &input, STEP_MS);
            let s2 = tick(&mut a2, &input, STEP_MS);
            assert_eq!(s1, s2);
            if let Some(offers) = a1.level_up_offers() {
                let first = offers[0];
                a1.choose_upgrade(&first);
                a2.choose_upgrade(&first);
            }
        }

        assert_eq!(a1.enemies.len(), a2.enemies.len());
        for (e1, e2) in a1.enemies.iter().zip(&a2.enemies) {
            assert_eq!(e1.id, e2.id);
            assert_eq!(e1.pos, e2.pos);
        }
        assert_eq!(a1.player.pos, a2.player.pos);
    }
}
