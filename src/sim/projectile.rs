//! Projectiles in flight

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Circle, Lifecycle, Mortal};
use crate::{Bounds, direction_from_angle};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Fixed at creation, pixels per second
    pub vel: Vec2,
    pub radius: f32,
    /// Base damage (the player's damage multiplier is applied on impact)
    pub damage: f32,
    /// Additional enemies this projectile may pass through
    pub pierce: u32,
    pub range: f32,
    pub traveled: f32,
    /// Enemy ids already damaged by this projectile
    pub hit_list: Vec<u32>,
    pub explosion_radius: Option<f32>,
    /// Per-step knockback magnitude
    pub knockback: f32,
    pub life: Lifecycle,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pos: Vec2,
        angle: f32,
        speed: f32,
        radius: f32,
        damage: f32,
        pierce: u32,
        range: f32,
        explosion_radius: Option<f32>,
        knockback: f32,
    ) -> Self {
        Self {
            pos,
            vel: direction_from_angle(angle) * speed,
            radius,
            damage,
            pierce,
            range,
            traveled: 0.0,
            hit_list: Vec::new(),
            explosion_radius,
            knockback,
            life: Lifecycle::Alive,
        }
    }

    #[inline]
    pub fn is_explosive(&self) -> bool {
        self.explosion_radius.is_some()
    }

    /// Direction of travel in radians
    pub fn angle(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_list.contains(&enemy_id)
    }

    /// Advance one step; expire past range or outside the playfield
    pub fn update(&mut self, dt: f32, bounds: Bounds) {
        if !self.life.is_alive() {
            return;
        }
        let delta = self.vel * dt;
        self.pos += delta;
        self.traveled += delta.length();
        if self.traveled >= self.range || !bounds.contains(self.pos) {
            self.life.begin_removal();
        }
    }

    /// Spend pierce on a direct hit. Returns false when the projectile is spent.
    pub fn register_hit(&mut self, enemy_id: u32) -> bool {
        if self.pierce > 0 {
            self.pierce -= 1;
            self.hit_list.push(enemy_id);
            true
        } else {
            self.life.begin_removal();
            false
        }
    }
}

impl Circle for Projectile {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Mortal for Projectile {
    fn lifecycle(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STEP_SECS;

    fn bullet(pos: Vec2, angle: f32, range: f32) -> Projectile {
        Projectile::new(pos, angle, 480.0, 4.0, 10.0, 0, range, None, 2.0)
    }

    #[test]
    fn test_expires_at_range() {
        let bounds = Bounds::new(10_000.0, 10_000.0);
        let mut p = bullet(Vec2::new(100.0, 100.0), 0.0, 36.0);
        let mut last = 0.0;
        let mut steps = 0;
        while p.life.is_alive() {
            p.update(STEP_SECS, bounds);
            assert!(p.traveled >= last);
            last = p.traveled;
            steps += 1;
        }
        // 8 px per step: 32 px after 4 steps, past range on the 5th
        assert_eq!(steps, 5);
        assert!(p.traveled >= p.range);
    }

    #[test]
    fn test_expires_outside_bounds() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut p = bullet(Vec2::new(95.0, 50.0), 0.0, 1000.0);
        p.update(STEP_SECS, bounds);
        assert!(!p.life.is_alive());
        assert!(p.traveled < p.range);
    }

    #[test]
    fn test_pierce_spent_then_removed() {
        let mut p = bullet(Vec2::ZERO, 0.0, 100.0);
        p.pierce = 1;
        assert!(p.register_hit(7));
        assert!(p.has_hit(7));
        assert_eq!(p.pierce, 0);
        assert!(!p.register_hit(8));
        assert!(!p.life.is_alive());
    }
}
