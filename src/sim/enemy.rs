//! Chasing enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Circle, Lifecycle, Mortal};
use crate::tuning::EnemyArchetype;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Boss,
    ];

    /// Archetypes the director draws from by weight (the boss is scheduled separately)
    pub const WEIGHTED: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Pixels per second
    pub speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Contact damage
    pub damage: f32,
    pub xp: u32,
    pub gold_chance: f64,
    /// Per-step displacement that decays toward zero
    pub knockback: Vec2,
    pub life: Lifecycle,
}

impl Enemy {
    /// Instantiate an archetype, scaling its HP by the current difficulty
    pub fn spawn(id: u32, kind: EnemyKind, archetype: &EnemyArchetype, pos: Vec2, difficulty: f32) -> Self {
        let hp = archetype.hp * difficulty;
        Self {
            id,
            kind,
            pos,
            radius: archetype.radius,
            speed: archetype.speed,
            hp,
            max_hp: hp,
            damage: archetype.damage,
            xp: archetype.xp,
            gold_chance: archetype.gold_chance,
            knockback: Vec2::ZERO,
            life: Lifecycle::Alive,
        }
    }

    /// Chase `target` and bleed off knockback
    pub fn update(&mut self, target: Vec2, dt: f32, knockback_decay: f32) {
        if !self.life.is_alive() {
            return;
        }
        let dir = (target - self.pos).normalize_or_zero();
        self.pos += dir * self.speed * dt;
        self.pos += self.knockback;
        self.knockback *= knockback_decay;
    }

    /// Apply damage and replace the knockback vector.
    ///
    /// Returns true only for the hit that kills, so rewards are credited once.
    pub fn take_damage(&mut self, amount: f32, knockback: Vec2) -> bool {
        if !self.life.is_alive() {
            return false;
        }
        self.hp -= amount;
        self.knockback = knockback;
        if self.hp <= 0.0 {
            return self.life.begin_removal();
        }
        false
    }
}

impl Circle for Enemy {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Mortal for Enemy {
    fn lifecycle(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STEP_SECS;
    use crate::tuning::EnemyRoster;

    fn basic_at(pos: Vec2) -> Enemy {
        Enemy::spawn(1, EnemyKind::Basic, &EnemyRoster::default().basic, pos, 1.0)
    }

    #[test]
    fn test_difficulty_scales_hp() {
        let e = Enemy::spawn(1, EnemyKind::Tank, &EnemyRoster::default().tank, Vec2::ZERO, 1.4);
        assert_eq!(e.hp, 70.0);
        assert_eq!(e.max_hp, 70.0);
    }

    #[test]
    fn test_chases_target() {
        let mut e = basic_at(Vec2::new(0.0, 0.0));
        let target = Vec2::new(100.0, 0.0);
        e.update(target, STEP_SECS, 0.9);
        assert!((e.pos.x - 120.0 * STEP_SECS).abs() < 1e-4);
        assert_eq!(e.pos.y, 0.0);
    }

    #[test]
    fn test_knockback_overwrites_and_decays() {
        let mut e = basic_at(Vec2::new(50.0, 50.0));
        e.take_damage(1.0, Vec2::new(4.0, 0.0));
        e.take_damage(1.0, Vec2::new(0.0, 2.0));
        assert_eq!(e.knockback, Vec2::new(0.0, 2.0));

        // Standing on the target isolates the knockback term
        let target = e.pos;
        e.update(target, STEP_SECS, 0.9);
        assert!((e.knockback.y - 1.8).abs() < 1e-6);
        for _ in 0..200 {
            let t = e.pos;
            e.update(t, STEP_SECS, 0.9);
        }
        assert!(e.knockback.length() < 1e-6);
    }

    #[test]
    fn test_kill_credited_once() {
        let mut e = basic_at(Vec2::ZERO);
        assert!(!e.take_damage(10.0, Vec2::ZERO));
        assert_eq!(e.hp, 5.0);
        assert!(e.take_damage(10.0, Vec2::ZERO));
        assert!(!e.take_damage(10.0, Vec2::ZERO));
        assert_eq!(e.life, Lifecycle::PendingRemoval);
        assert_eq!(e.hp, -5.0);
    }
}
