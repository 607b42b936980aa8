//! Platform abstraction layer
//!
//! The simulation is host-agnostic; this layer adapts it to a host:
//! - Browser: `web::WebArena`, a wasm-bindgen facade speaking JSON strings
//! - Native: the headless runner in `main.rs` drives `sim` directly

#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::Serialize;

use crate::MetaProgress;
use crate::sim::Arena;

/// Serialize a value for the host, falling back to `null` on failure
pub fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to serialize for host: {}", e);
            String::from("null")
        }
    }
}

/// Moves gold picked up in a run into meta-progress as it is earned.
///
/// `settle` must run before anything that resets the arena (quit, restart),
/// otherwise the unbanked part of the run is lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoldLedger {
    /// Part of the current run's gold already deposited
    banked: u32,
}

impl GoldLedger {
    /// Deposit gold earned since the last settle; returns the amount moved
    pub fn settle(&mut self, arena: &Arena, meta: &mut MetaProgress) -> u32 {
        let earned = arena.outcome().gold_earned;
        let fresh = earned.saturating_sub(self.banked);
        if fresh > 0 {
            meta.deposit(fresh);
            log::debug!("Banked {} gold (total {})", fresh, meta.gold);
        }
        self.banked = earned;
        fresh
    }

    /// Bank what is left of the run; call right before the arena is reset
    pub fn close_run(&mut self, arena: &Arena, meta: &mut MetaProgress) {
        self.settle(arena, meta);
        self.banked = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::{GamePhase, UpgradeOffer};

    #[test]
    fn test_to_json_values() {
        assert_eq!(to_json(&GamePhase::Playing), "\"Playing\"");
        assert_eq!(to_json(&UpgradeOffer::FullHeal), "\"FullHeal\"");
        assert_eq!(to_json(&Option::<u32>::None), "null");
    }

    fn arena_with_gold(gold: u32) -> (Arena, MetaProgress) {
        let meta = MetaProgress::default();
        let mut arena = Arena::new(7, Tuning::default());
        arena.start_run(&meta);
        arena.gold_earned = gold;
        (arena, meta)
    }

    #[test]
    fn test_gold_kept_when_quitting_mid_run() {
        let (mut arena, mut meta) = arena_with_gold(10);
        let mut ledger = GoldLedger::default();

        ledger.close_run(&arena, &mut meta);
        arena.quit();
        assert_eq!(meta.gold, 10);

        // Nothing is banked twice after the reset
        ledger.settle(&arena, &mut meta);
        assert_eq!(meta.gold, 10);
    }

    #[test]
    fn test_gold_banked_incrementally_and_once() {
        let (mut arena, mut meta) = arena_with_gold(10);
        let mut ledger = GoldLedger::default();

        assert_eq!(ledger.settle(&arena, &mut meta), 10);
        assert_eq!(ledger.settle(&arena, &mut meta), 0);
        arena.gold_earned = 25;
        assert_eq!(ledger.settle(&arena, &mut meta), 15);
        assert_eq!(meta.gold, 25);

        // Restarting keeps the total and counts the new run from zero
        ledger.close_run(&arena, &mut meta);
        arena.start_run(&meta);
        arena.gold_earned = 5;
        assert_eq!(ledger.settle(&arena, &mut meta), 5);
        assert_eq!(meta.gold, 30);
    }
}
