//! Collision detection and response
//!
//! Everything is circle vs circle. Enemies are bucketed in the spatial grid
//! once per step; projectiles and the player query it for candidates.
//! Rewards for kills are collected into `Kill` records and turned into drops
//! by the caller, so nothing spawned here is collectible until the next step.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Enemy, EnemyKind};
use super::entity::Area;
use super::grid::SpatialGrid;
use super::pickup::{Pickup, PickupKind};
use super::player::Player;
use super::projectile::Projectile;
use super::state::GameEvent;
use crate::tuning::CombatTuning;
use crate::{circles_overlap, distance};

/// What a dead enemy leaves behind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub enemy_id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub xp: u32,
    pub gold_chance: f64,
}

impl Kill {
    fn of(enemy: &Enemy) -> Self {
        Self {
            enemy_id: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos,
            xp: enemy.xp,
            gold_chance: enemy.gold_chance,
        }
    }
}

/// Rewards from pickups touched this step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haul {
    pub levels: u32,
    pub gold: u32,
}

/// Re-bucket every living enemy by its current position
pub fn rebuild_grid(grid: &mut SpatialGrid, enemies: &[Enemy]) {
    grid.clear();
    for (i, enemy) in enemies.iter().enumerate() {
        if enemy.life.is_alive() {
            grid.insert_circle(i, enemy);
        }
    }
}

/// Damage an enemy and record the kill if this hit finished it
fn hit_enemy(
    enemy: &mut Enemy,
    damage: f32,
    knockback: Vec2,
    splash: bool,
    kills: &mut Vec<Kill>,
    events: &mut Vec<GameEvent>,
) {
    events.push(GameEvent::Damage {
        pos: enemy.pos,
        amount: damage,
        splash,
    });
    if enemy.take_damage(damage, knockback) {
        kills.push(Kill::of(enemy));
        events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos,
        });
    }
}

/// Full damage to every living enemy whose center is within `radius`
#[allow(clippy::too_many_arguments)]
pub fn area_damage(
    grid: &SpatialGrid,
    enemies: &mut [Enemy],
    center: Vec2,
    radius: f32,
    damage: f32,
    knockback: f32,
    kills: &mut Vec<Kill>,
    events: &mut Vec<GameEvent>,
) {
    events.push(GameEvent::Explosion {
        pos: center,
        radius,
    });
    for idx in grid.query_circle(&Area { center, radius }) {
        let enemy = &mut enemies[idx];
        if !enemy.life.is_alive() || distance(center, enemy.pos) > radius {
            continue;
        }
        let push = (enemy.pos - center).normalize_or_zero() * knockback;
        hit_enemy(enemy, damage, push, true, kills, events);
    }
}

/// Resolve every live projectile against the enemies it overlaps.
///
/// Explosive projectiles detonate on first contact. Others damage each enemy
/// once, spending pierce, and stop the moment they are spent.
pub fn projectiles_vs_enemies(
    grid: &SpatialGrid,
    projectiles: &mut [Projectile],
    enemies: &mut [Enemy],
    damage_multiplier: f32,
    combat: &CombatTuning,
    kills: &mut Vec<Kill>,
    events: &mut Vec<GameEvent>,
) {
    for proj in projectiles.iter_mut() {
        if !proj.life.is_alive() {
            continue;
        }
        for idx in grid.query_circle(&*proj) {
            let enemy = &mut enemies[idx];
            if !enemy.life.is_alive()
                || proj.has_hit(enemy.id)
                || !circles_overlap(proj.pos, proj.radius, enemy.pos, enemy.radius)
            {
                continue;
            }

            let damage = proj.damage * damage_multiplier;
            if let Some(radius) = proj.explosion_radius {
                proj.life.begin_removal();
                let knockback = proj.knockback * combat.explosion_knockback_scale;
                area_damage(grid, enemies, proj.pos, radius, damage, knockback, kills, events);
                break;
            }

            let push = (enemy.pos - proj.pos).normalize_or_zero() * proj.knockback;
            let id = enemy.id;
            hit_enemy(enemy, damage, push, false, kills, events);
            if !proj.register_hit(id) {
                break;
            }
        }
    }
}

/// Contact damage from overlapping enemies. Returns true if the player died.
pub fn player_vs_enemies(
    grid: &SpatialGrid,
    player: &mut Player,
    enemies: &[Enemy],
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> bool {
    for idx in grid.query_circle(&*player) {
        let enemy = &enemies[idx];
        if !enemy.life.is_alive()
            || !circles_overlap(player.pos, player.radius, enemy.pos, enemy.radius)
        {
            continue;
        }
        let before = player.hp;
        let died = player.take_damage(enemy.damage, now_ms);
        if player.hp < before {
            events.push(GameEvent::PlayerHit {
                amount: enemy.damage,
                hp: player.hp,
            });
        }
        if died {
            events.push(GameEvent::PlayerDied);
            return true;
        }
    }
    false
}

/// Collect every pickup touching the player
pub fn player_vs_pickups(
    player: &mut Player,
    pickups: &mut [Pickup],
    events: &mut Vec<GameEvent>,
) -> Haul {
    let mut haul = Haul::default();
    for pickup in pickups.iter_mut() {
        if !pickup.life.is_alive()
            || !circles_overlap(player.pos, player.radius, pickup.pos, pickup.radius)
        {
            continue;
        }
        if !pickup.life.begin_removal() {
            continue;
        }
        match pickup.kind {
            PickupKind::Xp => haul.levels += player.gain_xp(pickup.value),
            PickupKind::Gold => haul.gold += pickup.value,
        }
        events.push(GameEvent::PickupCollected {
            kind: pickup.kind,
            value: pickup.value,
        });
    }
    haul
}

/// Turn kills into pickups: always experience, sometimes gold
pub fn spawn_drops<R: Rng>(kills: &[Kill], combat: &CombatTuning, rng: &mut R) -> Vec<Pickup> {
    let mut drops = Vec::with_capacity(kills.len());
    for kill in kills {
        drops.push(Pickup::new(PickupKind::Xp, kill.pos, kill.xp));
        if rng.random_bool(kill.gold_chance.clamp(0.0, 1.0)) {
            let offset = Vec2::splat(combat.gold_drop_offset);
            drops.push(Pickup::new(
                PickupKind::Gold,
                kill.pos + offset,
                combat.gold_drop_value,
            ));
        }
    }
    drops
}
