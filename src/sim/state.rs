//! Arena state and the commands the UI shell sends into it
//!
//! One `Arena` owns everything a run needs (tuning, RNG, grid, entities), so
//! there is no ambient state. The host reads `Snapshot`s and the public entity
//! vectors for rendering, and drains `GameEvent`s for effects.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::Director;
use super::enemy::{Enemy, EnemyKind};
use super::grid::SpatialGrid;
use super::pickup::{Pickup, PickupKind};
use super::player::{Modifiers, Player};
use super::projectile::Projectile;
use super::upgrades::{UpgradeOffer, roll_offers};
use super::weapon::{Weapon, WeaponKind};
use crate::{Bounds, MetaProgress, Tuning};

/// Top-level run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run started yet (or the last one was quit)
    Idle,
    /// Active gameplay
    Playing,
    /// Suspended by the player
    Paused,
    /// Suspended while a level-up menu is open
    LevelUp,
    /// Run ended (see `RunOutcome::won`)
    GameOver,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    /// Floating damage number
    Damage { pos: Vec2, amount: f32, splash: bool },
    Explosion { pos: Vec2, radius: f32 },
    EnemyKilled { id: u32, kind: EnemyKind, pos: Vec2 },
    PlayerHit { amount: f32, hp: f32 },
    PlayerDied,
    PickupCollected { kind: PickupKind, value: u32 },
    LevelUp { level: u32 },
    WeaponAcquired { kind: WeaponKind },
    WeaponUpgraded { kind: WeaponKind, level: u32 },
    RunEnded { won: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSummary {
    pub kind: WeaponKind,
    pub name: String,
    pub level: u32,
}

/// HUD view of the arena after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub hp: f32,
    pub max_hp: f32,
    pub xp: u32,
    pub max_xp: u32,
    pub level: u32,
    pub elapsed_seconds: f32,
    pub kills: u32,
    pub gold_earned: u32,
    pub weapons: Vec<WeaponSummary>,
}

/// End-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub ended: bool,
    pub won: bool,
    pub elapsed_seconds: f32,
    pub gold_earned: u32,
    pub kills: u32,
    pub level: u32,
}

/// The simulation context for one run
#[derive(Debug, Clone)]
pub struct Arena {
    pub tuning: Tuning,
    pub bounds: Bounds,
    pub phase: GamePhase,
    pub player: Player,
    pub weapons: Vec<Weapon>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub director: Director,
    /// Simulated run time (the clock cooldowns and invincibility use)
    pub elapsed_ms: f64,
    pub kills: u32,
    pub gold_earned: u32,
    pub won: bool,
    pub(crate) grid: SpatialGrid,
    pub(crate) rng: Pcg32,
    /// Frame time not yet consumed by fixed steps
    pub(crate) accumulator_ms: f64,
    pub(crate) pending_level_ups: u32,
    pub(crate) offers: Vec<UpgradeOffer>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) next_id: u32,
}

impl Arena {
    /// Create an idle arena. `tuning` is expected to be validated already.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let bounds = tuning.world;
        let grid = SpatialGrid::new(bounds, tuning.combat.grid_cell_size);
        let player = Player::new(&tuning.player, Modifiers::default(), bounds);
        Self {
            bounds,
            phase: GamePhase::Idle,
            player,
            weapons: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            director: Director::new(),
            elapsed_ms: 0.0,
            kills: 0,
            gold_earned: 0,
            won: false,
            grid,
            rng: Pcg32::seed_from_u64(seed),
            accumulator_ms: 0.0,
            pending_level_ups: 0,
            offers: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Discard everything from the previous run and start a fresh one
    pub fn start_run(&mut self, meta: &MetaProgress) {
        self.clear_run();
        self.player = Player::new(&self.tuning.player, Modifiers::from(meta), self.bounds);

        if let Some(spec) = self.tuning.weapon(self.tuning.starting_weapon) {
            self.weapons
                .push(Weapon::new(spec, self.tuning.combat.base_knockback));
        } else {
            log::warn!(
                "Starting weapon {:?} missing from arsenal",
                self.tuning.starting_weapon
            );
        }

        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::RunStarted);
        log::info!(
            "Run started: hp={} speed={} dmg x{:.2}",
            self.player.stats.max_hp,
            self.player.stats.speed,
            self.player.modifiers.damage
        );
    }

    /// Leave the run (back to menu); all live entities are dropped
    pub fn quit(&mut self) {
        self.clear_run();
        self.phase = GamePhase::Idle;
    }

    fn clear_run(&mut self) {
        self.weapons.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.grid.clear();
        self.director = Director::new();
        self.elapsed_ms = 0.0;
        self.kills = 0;
        self.gold_earned = 0;
        self.won = false;
        self.accumulator_ms = 0.0;
        self.pending_level_ups = 0;
        self.offers.clear();
        self.events.clear();
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.elapsed_ms / 1000.0) as f32
    }

    /// Effective range of the starting weapon (0 if not owned)
    pub fn attack_zone(&self) -> f32 {
        self.weapons
            .iter()
            .find(|w| w.kind == self.tuning.starting_weapon)
            .map(|w| w.effective_range(&self.player.modifiers))
            .unwrap_or(0.0)
    }

    /// Radius inside which pickups magnetize
    pub fn magnet_range(&self) -> f32 {
        self.player.stats.pickup_range.max(self.attack_zone())
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Paused at {:.1}s", self.elapsed_secs());
        }
    }

    /// Resume play; frame time accumulated while paused is discarded
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            self.accumulator_ms = 0.0;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Viewport changed: re-dimension the grid and keep the player inside
    pub fn resize(&mut self, bounds: Bounds) {
        let bounds = Bounds::new(bounds.width.max(0.0), bounds.height.max(0.0));
        self.bounds = bounds;
        self.grid.resize(bounds);
        self.player.pos = bounds.clamp_circle(self.player.pos, self.player.radius);
        log::info!("Arena resized to {}x{}", bounds.width, bounds.height);
    }

    /// Cards on offer while a level-up menu is open
    pub fn level_up_offers(&self) -> Option<&[UpgradeOffer]> {
        (self.phase == GamePhase::LevelUp).then_some(self.offers.as_slice())
    }

    /// Queue level-ups earned this step and open the first menu
    pub(crate) fn open_level_up(&mut self) {
        if self.pending_level_ups == 0 {
            return;
        }
        self.offers = roll_offers(
            &self.weapons,
            &self.tuning.arsenal,
            &self.tuning.upgrades,
            &mut self.rng,
        );
        self.phase = GamePhase::LevelUp;
        log::info!(
            "Level up! level={} offers={}",
            self.player.level,
            self.offers.len()
        );
    }

    /// Apply a card from the current menu.
    ///
    /// Anything not on the menu is ignored and leaves the run untouched.
    pub fn choose_upgrade(&mut self, offer: &UpgradeOffer) -> bool {
        if self.phase != GamePhase::LevelUp || !self.offers.contains(offer) {
            log::warn!("Ignoring upgrade {:?} (not on offer)", offer);
            return false;
        }

        match *offer {
            UpgradeOffer::Upgrade { kind, .. } => {
                let Some(weapon) = self.weapons.iter_mut().find(|w| w.kind == kind) else {
                    log::warn!("Ignoring upgrade for unowned {:?}", kind);
                    return false;
                };
                weapon.upgrade(&self.tuning.upgrades);
                self.events.push(GameEvent::WeaponUpgraded {
                    kind,
                    level: weapon.level,
                });
            }
            UpgradeOffer::NewWeapon { kind } => {
                let Some(spec) = self.tuning.weapon(kind) else {
                    log::warn!("Ignoring unknown weapon {:?}", kind);
                    return false;
                };
                self.weapons
                    .push(Weapon::new(spec, self.tuning.combat.base_knockback));
                self.events.push(GameEvent::WeaponAcquired { kind });
            }
            UpgradeOffer::FullHeal => {
                let max = self.player.stats.max_hp;
                self.player.heal(max);
            }
        }

        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        self.offers.clear();
        self.accumulator_ms = 0.0;
        if self.pending_level_ups > 0 {
            self.open_level_up();
        } else {
            self.phase = GamePhase::Playing;
        }
        true
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            hp: self.player.hp,
            max_hp: self.player.stats.max_hp,
            xp: self.player.xp,
            max_xp: self.player.xp_to_next,
            level: self.player.level,
            elapsed_seconds: self.elapsed_secs(),
            kills: self.kills,
            gold_earned: self.gold_earned,
            weapons: self
                .weapons
                .iter()
                .map(|w| WeaponSummary {
                    kind: w.kind,
                    name: w.name().to_string(),
                    level: w.level,
                })
                .collect(),
        }
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            ended: self.phase == GamePhase::GameOver,
            won: self.won,
            elapsed_seconds: self.elapsed_secs(),
            gold_earned: self.gold_earned,
            kills: self.kills,
            level: self.player.level,
        }
    }
}
