//! Experience gems and gold coins

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Circle, Lifecycle, Mortal};
use crate::consts::{GOLD_PICKUP_RADIUS, XP_PICKUP_RADIUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Xp,
    Gold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub value: u32,
    pub radius: f32,
    /// Once set, the pickup homes in on the player for good
    pub magnetized: bool,
    /// Homing speed, pixels per second
    pub speed: f32,
    pub life: Lifecycle,
}

impl Pickup {
    pub fn new(kind: PickupKind, pos: Vec2, value: u32) -> Self {
        let radius = match kind {
            PickupKind::Xp => XP_PICKUP_RADIUS,
            PickupKind::Gold => GOLD_PICKUP_RADIUS,
        };
        Self {
            pos,
            kind,
            value,
            radius,
            magnetized: false,
            speed: 0.0,
            life: Lifecycle::Alive,
        }
    }

    /// Magnet behavior: latch within `magnet_range`, then accelerate toward the player
    pub fn update(&mut self, player_pos: Vec2, magnet_range: f32, accel: f32, dt: f32) {
        if !self.life.is_alive() {
            return;
        }
        let to_player = player_pos - self.pos;
        let dist = to_player.length();
        if dist < magnet_range {
            self.magnetized = true;
        }
        if self.magnetized {
            self.speed += accel;
            // Never overshoot the player's center
            let travel = (self.speed * dt).min(dist);
            self.pos += to_player.normalize_or_zero() * travel;
        }
    }
}

impl Circle for Pickup {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Mortal for Pickup {
    fn lifecycle(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STEP_SECS;

    #[test]
    fn test_stationary_outside_range() {
        let mut p = Pickup::new(PickupKind::Xp, Vec2::new(300.0, 0.0), 10);
        p.update(Vec2::ZERO, 100.0, 30.0, STEP_SECS);
        assert!(!p.magnetized);
        assert_eq!(p.pos, Vec2::new(300.0, 0.0));
    }

    #[test]
    fn test_magnet_latches_and_accelerates() {
        let mut p = Pickup::new(PickupKind::Gold, Vec2::new(90.0, 0.0), 10);
        p.update(Vec2::ZERO, 100.0, 30.0, STEP_SECS);
        assert!(p.magnetized);
        let first_step = 90.0 - p.pos.x;

        // Player runs away; the pickup keeps chasing faster and faster
        let far = Vec2::new(-1000.0, 0.0);
        let before = p.pos.x;
        p.update(far, 100.0, 30.0, STEP_SECS);
        let second_step = before - p.pos.x;
        assert!(p.magnetized);
        assert!(second_step > first_step);
    }

    #[test]
    fn test_does_not_overshoot() {
        let mut p = Pickup::new(PickupKind::Xp, Vec2::new(1.0, 0.0), 10);
        p.speed = 10_000.0;
        p.update(Vec2::ZERO, 100.0, 30.0, STEP_SECS);
        assert!(p.pos.length() < 1e-6);
    }
}
