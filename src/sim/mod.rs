//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, grid results sorted by index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod director;
pub mod enemy;
pub mod entity;
pub mod grid;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod weapon;

pub use collision::{Haul, Kill};
pub use director::Director;
pub use enemy::{Enemy, EnemyKind};
pub use entity::{Circle, Lifecycle, Mortal};
pub use grid::SpatialGrid;
pub use pickup::{Pickup, PickupKind};
pub use player::{Modifiers, Player, PlayerStats};
pub use projectile::Projectile;
pub use state::{Arena, GameEvent, GamePhase, RunOutcome, Snapshot, WeaponSummary};
pub use tick::{TickInput, autopilot, step, tick};
pub use upgrades::{UpgradeOffer, roll_offers};
pub use weapon::{FirePattern, Weapon, WeaponKind};
