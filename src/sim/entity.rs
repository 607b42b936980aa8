//! Shared entity plumbing: lifecycle state and the collidable capability

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lifecycle of a short-lived entity (enemy, projectile, pickup)
///
/// `Alive -> PendingRemoval` happens at most once; the step that triggers it
/// owns the side effects (kill credit, pickup reward). The end-of-step sweep
/// moves pending entities to `Removed` and drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Alive,
    PendingRemoval,
    Removed,
}

impl Lifecycle {
    /// The one predicate every system checks before touching an entity
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Lifecycle::Alive)
    }

    /// Flag for removal. Returns true only for the call that made the transition.
    pub fn begin_removal(&mut self) -> bool {
        if self.is_alive() {
            *self = Lifecycle::PendingRemoval;
            true
        } else {
            false
        }
    }

    /// Sweep step: pending entities become removed
    pub fn finish_removal(&mut self) {
        if *self == Lifecycle::PendingRemoval {
            *self = Lifecycle::Removed;
        }
    }
}

/// Anything that takes part in circle collision
pub trait Circle {
    fn center(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Entities that carry a lifecycle
pub trait Mortal {
    fn lifecycle(&mut self) -> &mut Lifecycle;
}

/// Drop everything that was flagged for removal this step
pub fn sweep<T: Mortal>(entities: &mut Vec<T>) {
    for e in entities.iter_mut() {
        e.lifecycle().finish_removal();
    }
    entities.retain_mut(|e| *e.lifecycle() != Lifecycle::Removed);
}

/// A bare circle, used for area queries (explosions)
#[derive(Debug, Clone, Copy)]
pub struct Area {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle for Area {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}
