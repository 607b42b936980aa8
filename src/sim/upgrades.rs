//! Level-up card menu

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::weapon::{Weapon, WeaponKind};
use crate::tuning::{UpgradeTuning, WeaponSpec};

/// One card on the level-up screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeOffer {
    /// Level up a weapon already owned
    Upgrade { kind: WeaponKind, next_level: u32 },
    /// Add a weapon not yet owned
    NewWeapon { kind: WeaponKind },
    /// Fallback when nothing else can be offered
    FullHeal,
}

impl UpgradeOffer {
    pub fn title(&self) -> String {
        match self {
            UpgradeOffer::Upgrade { kind, .. } => format!("Upgrade: {}", kind.display_name()),
            UpgradeOffer::NewWeapon { kind } => format!("New: {}", kind.display_name()),
            UpgradeOffer::FullHeal => "Full Heal".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            UpgradeOffer::Upgrade { next_level, .. } => format!("Stats UP! Level: {}", next_level),
            UpgradeOffer::NewWeapon { kind } => {
                format!("Add {} to your arsenal.", kind.display_name())
            }
            UpgradeOffer::FullHeal => "Restore 100% HP".to_string(),
        }
    }
}

fn take_random<T, R: Rng>(pool: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if pool.is_empty() {
        None
    } else {
        let i = rng.random_range(0..pool.len());
        Some(pool.swap_remove(i))
    }
}

/// Draw a menu of distinct cards, preferring upgrades of owned weapons
pub fn roll_offers<R: Rng>(
    owned: &[Weapon],
    arsenal: &[WeaponSpec],
    tuning: &UpgradeTuning,
    rng: &mut R,
) -> Vec<UpgradeOffer> {
    let mut upgrades: Vec<UpgradeOffer> = owned
        .iter()
        .map(|w| UpgradeOffer::Upgrade {
            kind: w.kind,
            next_level: w.level + 1,
        })
        .collect();
    let mut fresh: Vec<UpgradeOffer> = arsenal
        .iter()
        .filter(|spec| !owned.iter().any(|w| w.kind == spec.kind))
        .map(|spec| UpgradeOffer::NewWeapon { kind: spec.kind })
        .collect();

    let mut offers = Vec::with_capacity(tuning.choices);
    for _ in 0..tuning.choices {
        let want_upgrade = fresh.is_empty() || rng.random_bool(tuning.upgrade_bias.clamp(0.0, 1.0));
        let choice = if want_upgrade {
            take_random(&mut upgrades, rng).or_else(|| take_random(&mut fresh, rng))
        } else {
            take_random(&mut fresh, rng).or_else(|| take_random(&mut upgrades, rng))
        };
        match choice {
            Some(offer) => offers.push(offer),
            None => break,
        }
    }

    if offers.is_empty() {
        offers.push(UpgradeOffer::FullHeal);
    }
    offers
}
