//! Cross-run meta-progress
//!
//! Permanent multipliers bought with gold between runs. The record is plain
//! serde data; where it is stored is the host's business.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected shop purchase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{item:?} costs {cost} gold, only {gold} available")]
    NotEnoughGold { item: MetaUpgrade, cost: u32, gold: u32 },
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaUpgrade {
    Damage,
    MaxHealth,
    Speed,
    Range,
    Knockback,
    /// +1 projectile per volley
    Amount,
    /// +1 pierce on every projectile
    Pierce,
}

impl MetaUpgrade {
    pub const ALL: [MetaUpgrade; 7] = [
        MetaUpgrade::Damage,
        MetaUpgrade::MaxHealth,
        MetaUpgrade::Speed,
        MetaUpgrade::Range,
        MetaUpgrade::Knockback,
        MetaUpgrade::Amount,
        MetaUpgrade::Pierce,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MetaUpgrade::Damage => "Increase Damage",
            MetaUpgrade::MaxHealth => "Max Health",
            MetaUpgrade::Speed => "Movement Speed",
            MetaUpgrade::Range => "Weapon Range",
            MetaUpgrade::Knockback => "Knockback",
            MetaUpgrade::Amount => "Extra Projectile",
            MetaUpgrade::Pierce => "Penetration",
        }
    }

    /// Price of the first purchase
    pub fn base_cost(&self) -> u32 {
        match self {
            MetaUpgrade::Damage | MetaUpgrade::MaxHealth | MetaUpgrade::Knockback => 100,
            MetaUpgrade::Speed | MetaUpgrade::Range => 150,
            MetaUpgrade::Amount => 500,
            MetaUpgrade::Pierce => 400,
        }
    }
}

/// Permanent player progress carried between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaProgress {
    pub gold: u32,
    pub damage_multiplier: f32,
    pub max_hp_multiplier: f32,
    pub speed_multiplier: f32,
    pub range_multiplier: f32,
    pub knockback_multiplier: f32,
    pub amount_bonus: u32,
    pub pierce_bonus: u32,
}

impl Default for MetaProgress {
    fn default() -> Self {
        Self {
            gold: 0,
            damage_multiplier: 1.0,
            max_hp_multiplier: 1.0,
            speed_multiplier: 1.0,
            range_multiplier: 1.0,
            knockback_multiplier: 1.0,
            amount_bonus: 0,
            pierce_bonus: 0,
        }
    }
}

impl MetaProgress {
    /// Current price of an item; grows with what is already owned
    pub fn cost(&self, item: MetaUpgrade) -> u32 {
        let base = item.base_cost() as f32;
        let price = match item {
            MetaUpgrade::Damage => base * self.damage_multiplier * 2.0,
            MetaUpgrade::MaxHealth => base * self.max_hp_multiplier * 2.0,
            MetaUpgrade::Speed => base * self.speed_multiplier * 2.0,
            MetaUpgrade::Range => base * self.range_multiplier * 2.0,
            MetaUpgrade::Knockback => base * self.knockback_multiplier * 2.0,
            MetaUpgrade::Amount => base * (1 + self.amount_bonus) as f32 * 2.0,
            MetaUpgrade::Pierce => base * (1 + self.pierce_bonus) as f32 * 2.0,
        };
        price.floor() as u32
    }

    /// Buy one level of `item`, returning the gold spent
    pub fn purchase(&mut self, item: MetaUpgrade) -> Result<u32, PurchaseError> {
        let cost = self.cost(item);
        if self.gold < cost {
            return Err(PurchaseError::NotEnoughGold {
                item,
                cost,
                gold: self.gold,
            });
        }
        self.gold -= cost;
        match item {
            MetaUpgrade::Damage => self.damage_multiplier += 0.1,
            MetaUpgrade::MaxHealth => self.max_hp_multiplier += 0.1,
            MetaUpgrade::Speed => self.speed_multiplier += 0.05,
            MetaUpgrade::Range => self.range_multiplier += 0.1,
            MetaUpgrade::Knockback => self.knockback_multiplier += 0.1,
            MetaUpgrade::Amount => self.amount_bonus += 1,
            MetaUpgrade::Pierce => self.pierce_bonus += 1,
        }
        log::info!("Purchased {} for {} gold", item.display_name(), cost);
        Ok(cost)
    }

    /// Bank gold collected during a run
    pub fn deposit(&mut self, gold: u32) {
        self.gold = self.gold.saturating_add(gold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_scales_with_owned_level() {
        let mut meta = MetaProgress::default();
        assert_eq!(meta.cost(MetaUpgrade::Damage), 200);
        assert_eq!(meta.cost(MetaUpgrade::Speed), 300);
        assert_eq!(meta.cost(MetaUpgrade::Amount), 1000);

        meta.amount_bonus = 1;
        assert_eq!(meta.cost(MetaUpgrade::Amount), 2000);
    }

    #[test]
    fn test_purchase_spends_gold_and_applies() {
        let mut meta = MetaProgress {
            gold: 250,
            ..Default::default()
        };
        assert_eq!(meta.purchase(MetaUpgrade::Damage), Ok(200));
        assert_eq!(meta.gold, 50);
        assert!((meta.damage_multiplier - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_purchase_rejected_without_gold() {
        let mut meta = MetaProgress {
            gold: 10,
            ..Default::default()
        };
        let before = meta.clone();
        let err = meta.purchase(MetaUpgrade::Pierce).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::NotEnoughGold {
                item: MetaUpgrade::Pierce,
                cost: 800,
                gold: 10
            }
        );
        assert_eq!(meta, before);
    }

    #[test]
    fn test_deposit_saturates() {
        let mut meta = MetaProgress {
            gold: u32::MAX - 1,
            ..Default::default()
        };
        meta.deposit(10);
        assert_eq!(meta.gold, u32::MAX);
    }
}
