//! Cell Survival - arena survival simulation core
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (entities, weapons, director, collisions)
//! - `tuning`: Data-driven game balance
//! - `meta`: Cross-run meta-progress and the upgrade shop
//! - `platform`: Browser facade for the UI shell

pub mod meta;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use meta::{MetaProgress, MetaUpgrade, PurchaseError};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step (60 Hz, the rate the balance tables were authored at)
    pub const STEP_MS: f64 = 1000.0 / 60.0;
    /// Fixed step in seconds
    pub const STEP_SECS: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are treated as a stall, not simulated time
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Default playfield
    pub const WORLD_WIDTH: f32 = 1280.0;
    pub const WORLD_HEIGHT: f32 = 720.0;

    /// Broad-phase cell size, must cover the largest entity radius
    pub const GRID_CELL_SIZE: f32 = 100.0;

    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const XP_PICKUP_RADIUS: f32 = 4.0;
    pub const GOLD_PICKUP_RADIUS: f32 = 6.0;

    /// Knockback applied by a weapon before upgrades and meta multipliers
    pub const BASE_KNOCKBACK: f32 = 2.0;
    /// Per-step knockback decay (multiplicative)
    pub const KNOCKBACK_DECAY: f32 = 0.9;
    /// Explosions push harder than direct hits
    pub const EXPLOSION_KNOCKBACK_SCALE: f32 = 2.5;

    /// Perpendicular spacing between barrels in parallel fire
    pub const PARALLEL_SPACING: f32 = 15.0;

    /// Magnetized pickups gain this much speed every step (px/s)
    pub const PICKUP_ACCEL_PER_STEP: f32 = 30.0;

    /// Enemies appear this far outside the visible edge
    pub const SPAWN_MARGIN: f32 = 50.0;

    pub const GOLD_DROP_VALUE: u32 = 10;
    pub const GOLD_DROP_OFFSET: f32 = 5.0;
}

/// Axis-aligned playfield, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: consts::WORLD_WIDTH,
            height: consts::WORLD_HEIGHT,
        }
    }
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Point lies on or inside the playfield
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Clamp a circle so it sits fully inside the playfield
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let mut p = center;
        if p.x - radius < 0.0 {
            p.x = radius;
        }
        if p.x + radius > self.width {
            p.x = self.width - radius;
        }
        if p.y - radius < 0.0 {
            p.y = radius;
        }
        if p.y + radius > self.height {
            p.y = self.height - radius;
        }
        p
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Angle (radians) of the ray from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector pointing along `theta`
#[inline]
pub fn direction_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Strict circle overlap (touching circles do not collide)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_circle_inside_bounds() {
        let bounds = Bounds::new(200.0, 100.0);

        let p = bounds.clamp_circle(Vec2::new(-20.0, 50.0), 10.0);
        assert_eq!(p, Vec2::new(10.0, 50.0));

        let p = bounds.clamp_circle(Vec2::new(250.0, 120.0), 10.0);
        assert_eq!(p, Vec2::new(190.0, 90.0));

        // Already inside - untouched
        let p = bounds.clamp_circle(Vec2::new(100.0, 50.0), 10.0);
        assert_eq!(p, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_circles_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_angle_to() {
        let a = angle_to(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert!((a - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        let d = direction_from_angle(a);
        assert!(d.x.abs() < 1e-6 && (d.y - 1.0).abs() < 1e-6);
    }
}
