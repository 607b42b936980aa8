//! Weapons: target selection, firing geometry, upgrades
//!
//! A weapon is a stat block plus a cooldown. Every shot composes the same way:
//! pick the nearest enemy, lay out `count` emitters according to the pattern
//! (fan or parallel barrels), and stamp pierce/splash/knockback onto each
//! projectile. Nothing is special-cased per weapon.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::player::Modifiers;
use super::projectile::Projectile;
use crate::tuning::{CombatTuning, UpgradeTuning, WeaponSpec};
use crate::{angle_to, direction_from_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Blaster,
    Scattergun,
    RapidFire,
    Railgun,
    Rpg,
}

impl WeaponKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            WeaponKind::Blaster => "Blaster",
            WeaponKind::Scattergun => "Scattergun",
            WeaponKind::RapidFire => "Rapid Fire",
            WeaponKind::Railgun => "Railgun",
            WeaponKind::Rpg => "RPG",
        }
    }
}

/// Emitter layout for a volley
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirePattern {
    /// Fan of the given total angle (radians), all from the player's center
    Spread(f32),
    /// Side-by-side barrels, all at the target angle
    Parallel { spacing: f32 },
}

impl FirePattern {
    /// Origin and heading of each of `count` projectiles aimed at `angle`
    pub fn emitters(&self, origin: Vec2, angle: f32, count: u32) -> Vec<(Vec2, f32)> {
        let n = count as f32;
        (0..count)
            .map(|i| {
                let i = i as f32;
                match *self {
                    FirePattern::Spread(spread) => {
                        if count > 1 {
                            let step = spread / (n - 1.0);
                            (origin, angle - spread / 2.0 + step * i)
                        } else {
                            (origin, angle)
                        }
                    }
                    FirePattern::Parallel { spacing } => {
                        let offset = (i - (n - 1.0) / 2.0) * spacing;
                        let perp = direction_from_angle(angle + std::f32::consts::FRAC_PI_2);
                        (origin + perp * offset, angle)
                    }
                }
            })
            .collect()
    }
}

/// Nearest live enemy strictly within `range` of `origin`
pub fn nearest_target(origin: Vec2, range: f32, enemies: &[Enemy]) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.life.is_alive())
        .map(|e| (e, origin.distance(e.pos)))
        .filter(|&(_, d)| d < range)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(e, _)| e)
}

/// An owned weapon with its current (upgraded) stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    pub damage: f32,
    pub cooldown_ms: f64,
    pub speed: f32,
    pub range: f32,
    pub spread: f32,
    pub count: u32,
    pub pierce: u32,
    pub explosion_radius: Option<f32>,
    pub knockback: f32,
    /// Arena clock of the last volley that produced projectiles
    pub last_fired_ms: Option<f64>,
}

impl Weapon {
    pub fn new(spec: &WeaponSpec, base_knockback: f32) -> Self {
        Self {
            kind: spec.kind,
            level: 1,
            damage: spec.damage,
            cooldown_ms: spec.cooldown_ms,
            speed: spec.speed,
            range: spec.range,
            spread: spec.spread,
            count: spec.count,
            pierce: spec.pierce,
            explosion_radius: spec.explosion_radius,
            knockback: base_knockback,
            last_fired_ms: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn pattern(&self, parallel_spacing: f32) -> FirePattern {
        if self.spread > 0.0 {
            FirePattern::Spread(self.spread)
        } else {
            FirePattern::Parallel {
                spacing: parallel_spacing,
            }
        }
    }

    pub fn effective_range(&self, mods: &Modifiers) -> f32 {
        self.range * mods.range
    }

    pub fn is_ready(&self, now_ms: f64) -> bool {
        self.last_fired_ms
            .is_none_or(|last| now_ms - last >= self.cooldown_ms)
    }

    /// Level up: damage every level, then count / cooldown / pierce in rotation
    pub fn upgrade(&mut self, tuning: &UpgradeTuning) {
        self.level += 1;
        self.damage *= tuning.damage_growth;
        match self.level % 3 {
            2 => self.count += 1,
            0 => self.cooldown_ms *= tuning.cooldown_factor,
            _ => self.pierce += 1,
        }
        self.knockback *= tuning.knockback_growth;
    }

    /// Fire at the nearest enemy if the cooldown allows.
    ///
    /// An empty result means no shot: the cooldown is left untouched.
    pub fn try_fire(
        &mut self,
        now_ms: f64,
        origin: Vec2,
        mods: &Modifiers,
        enemies: &[Enemy],
        combat: &CombatTuning,
    ) -> Vec<Projectile> {
        if !self.is_ready(now_ms) {
            return Vec::new();
        }
        let range = self.effective_range(mods);
        let Some(target) = nearest_target(origin, range, enemies) else {
            return Vec::new();
        };

        let angle = angle_to(origin, target.pos);
        let count = self.count + mods.amount_bonus;
        let pierce = self.pierce + mods.pierce_bonus;
        let knockback = combat.base_knockback * mods.knockback;

        let volley: Vec<Projectile> = self
            .pattern(combat.parallel_spacing)
            .emitters(origin, angle, count)
            .into_iter()
            .map(|(pos, heading)| {
                Projectile::new(
                    pos,
                    heading,
                    self.speed,
                    combat.projectile_radius,
                    self.damage,
                    pierce,
                    range,
                    self.explosion_radius,
                    knockback,
                )
            })
            .collect();

        if !volley.is_empty() {
            self.last_fired_ms = Some(now_ms);
        }
        volley
    }
}
