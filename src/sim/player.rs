//! The player avatar: movement, health, experience

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Circle;
use crate::tuning::PlayerTuning;
use crate::{Bounds, MetaProgress};

/// Run-constant multipliers derived from meta-progress at run start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub damage: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub range: f32,
    pub knockback: f32,
    pub amount_bonus: u32,
    pub pierce_bonus: u32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::from(&MetaProgress::default())
    }
}

impl From<&MetaProgress> for Modifiers {
    fn from(meta: &MetaProgress) -> Self {
        Self {
            damage: meta.damage_multiplier,
            max_hp: meta.max_hp_multiplier,
            speed: meta.speed_multiplier,
            range: meta.range_multiplier,
            knockback: meta.knockback_multiplier,
            amount_bonus: meta.amount_bonus,
            pierce_bonus: meta.pierce_bonus,
        }
    }
}

/// Derived stat block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub max_hp: f32,
    /// Pixels per second
    pub speed: f32,
    pub pickup_range: f32,
    pub invincibility_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Raw input direction (normalized on use)
    pub direction: Vec2,
    pub stats: PlayerStats,
    pub hp: f32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub level: u32,
    /// Arena clock (ms) until which contact damage is ignored
    pub invincible_until_ms: f64,
    pub modifiers: Modifiers,
    dead: bool,
    xp_growth: f32,
    level_up_heal: f32,
}

impl Player {
    /// Fresh player at the center of the playfield with meta-progress applied
    pub fn new(tuning: &PlayerTuning, modifiers: Modifiers, bounds: Bounds) -> Self {
        let max_hp = (tuning.max_hp * modifiers.max_hp).floor().max(1.0);
        Self {
            pos: bounds.center(),
            radius: tuning.radius,
            direction: Vec2::ZERO,
            stats: PlayerStats {
                max_hp,
                speed: tuning.speed * modifiers.speed,
                pickup_range: tuning.pickup_range,
                invincibility_ms: tuning.invincibility_ms,
            },
            hp: max_hp,
            xp: 0,
            xp_to_next: tuning.first_level_xp.max(1),
            level: 1,
            invincible_until_ms: 0.0,
            modifiers,
            dead: false,
            xp_growth: tuning.xp_growth,
            level_up_heal: tuning.level_up_heal,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[inline]
    pub fn is_invincible(&self, now_ms: f64) -> bool {
        now_ms < self.invincible_until_ms
    }

    /// Move along the input direction and stay inside the playfield
    pub fn update(&mut self, dt: f32, bounds: Bounds) {
        if self.dead {
            return;
        }
        let dir = self.direction.normalize_or_zero();
        self.pos += dir * self.stats.speed * dt;
        self.pos = bounds.clamp_circle(self.pos, self.radius);
    }

    /// Apply contact damage. Returns true exactly once: on the hit that kills.
    pub fn take_damage(&mut self, amount: f32, now_ms: f64) -> bool {
        if self.dead || self.is_invincible(now_ms) {
            return false;
        }
        self.hp -= amount;
        self.invincible_until_ms = now_ms + self.stats.invincibility_ms;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.dead = true;
            return true;
        }
        false
    }

    /// Restore HP up to the maximum; the dead stay dead
    pub fn heal(&mut self, amount: f32) {
        if self.dead {
            return;
        }
        self.hp = (self.hp + amount).min(self.stats.max_hp);
    }

    /// Add experience and return how many levels were gained
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        if self.dead {
            return 0;
        }
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = ((self.xp_to_next as f32 * self.xp_growth).floor() as u32).max(1);
            self.heal(self.stats.max_hp * self.level_up_heal);
            gained += 1;
        }
        gained
    }
}

impl Circle for Player {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}
