//! Data-driven game balance
//!
//! Every number the simulation reads lives here. `Tuning::default()` carries the
//! shipped balance; a host can override any subset from JSON (missing keys fall
//! back to the defaults) and must pass `validate` before a run starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Bounds;
use crate::consts::*;
use crate::sim::enemy::EnemyKind;
use crate::sim::weapon::WeaponKind;

/// Errors raised while loading or validating a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("stage table is empty")]
    NoStages,

    #[error("stage {index} starts at {start_secs}s, before the previous stage")]
    UnsortedStages { index: usize, start_secs: f32 },

    #[error("stage {index} lowers spawn pressure")]
    DecreasingPressure { index: usize },

    #[error("stage {index} has no positive archetype weight")]
    EmptyWeights { index: usize },

    #[error("grid cell size {cell_size} is smaller than the largest radius {radius}")]
    CellTooSmall { cell_size: f32, radius: f32 },

    #[error("knockback decay {0} must be within (0, 1)")]
    KnockbackDecay(f32),

    #[error("starting weapon {0:?} is not in the arsenal")]
    MissingStartingWeapon(WeaponKind),

    #[error("win time must be positive, got {0}")]
    WinTime(f32),
}

/// Player base stats before meta-progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: f32,
    /// Pixels per second
    pub speed: f32,
    pub pickup_range: f32,
    pub invincibility_ms: f64,
    pub radius: f32,
    pub first_level_xp: u32,
    /// Threshold growth per level (result is floored)
    pub xp_growth: f32,
    /// Fraction of max HP restored on each level-up
    pub level_up_heal: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            speed: 240.0,
            pickup_range: 100.0,
            invincibility_ms: 1000.0,
            radius: PLAYER_RADIUS,
            first_level_xp: 30,
            xp_growth: 1.1,
            level_up_heal: 0.2,
        }
    }
}

/// Stat template for one enemy archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub hp: f32,
    /// Contact damage dealt to the player
    pub damage: f32,
    /// Pixels per second
    pub speed: f32,
    pub radius: f32,
    pub xp: u32,
    pub gold_chance: f64,
}

/// One archetype per `EnemyKind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    pub basic: EnemyArchetype,
    pub fast: EnemyArchetype,
    pub tank: EnemyArchetype,
    pub boss: EnemyArchetype,
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            basic: EnemyArchetype {
                hp: 15.0,
                damage: 10.0,
                speed: 120.0,
                radius: 12.0,
                xp: 10,
                gold_chance: 0.1,
            },
            fast: EnemyArchetype {
                hp: 10.0,
                damage: 5.0,
                speed: 210.0,
                radius: 8.0,
                xp: 15,
                gold_chance: 0.15,
            },
            tank: EnemyArchetype {
                hp: 50.0,
                damage: 20.0,
                speed: 60.0,
                radius: 20.0,
                xp: 30,
                gold_chance: 0.3,
            },
            boss: EnemyArchetype {
                hp: 500.0,
                damage: 30.0,
                speed: 90.0,
                radius: 40.0,
                xp: 200,
                gold_chance: 1.0,
            },
        }
    }
}

impl EnemyRoster {
    pub fn get(&self, kind: EnemyKind) -> &EnemyArchetype {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Boss => &self.boss,
        }
    }

    pub fn largest_radius(&self) -> f32 {
        EnemyKind::ALL
            .iter()
            .map(|&k| self.get(k).radius)
            .fold(0.0, f32::max)
    }
}

/// Base stat template for a weapon (level 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub kind: WeaponKind,
    pub damage: f32,
    pub cooldown_ms: f64,
    /// Projectile speed, pixels per second
    pub speed: f32,
    pub range: f32,
    /// Fan angle in radians; 0 selects parallel barrels
    pub spread: f32,
    pub count: u32,
    pub pierce: u32,
    /// Splash radius for explosive rounds
    #[serde(default)]
    pub explosion_radius: Option<f32>,
}

fn default_arsenal() -> Vec<WeaponSpec> {
    vec![
        WeaponSpec {
            kind: WeaponKind::Blaster,
            damage: 10.0,
            cooldown_ms: 500.0,
            speed: 480.0,
            range: 220.0,
            spread: 0.0,
            count: 1,
            pierce: 0,
            explosion_radius: None,
        },
        WeaponSpec {
            kind: WeaponKind::Scattergun,
            damage: 8.0,
            cooldown_ms: 1000.0,
            speed: 420.0,
            range: 180.0,
            spread: 0.5,
            count: 5,
            pierce: 1,
            explosion_radius: None,
        },
        WeaponSpec {
            kind: WeaponKind::RapidFire,
            damage: 5.0,
            cooldown_ms: 100.0,
            speed: 600.0,
            range: 300.0,
            spread: 0.1,
            count: 1,
            pierce: 0,
            explosion_radius: None,
        },
        WeaponSpec {
            kind: WeaponKind::Railgun,
            damage: 100.0,
            cooldown_ms: 1500.0,
            speed: 1500.0,
            range: 600.0,
            spread: 0.0,
            count: 1,
            pierce: 10,
            explosion_radius: None,
        },
        WeaponSpec {
            kind: WeaponKind::Rpg,
            damage: 30.0,
            cooldown_ms: 1200.0,
            speed: 360.0,
            range: 350.0,
            spread: 0.0,
            count: 1,
            pierce: 0,
            explosion_radius: Some(100.0),
        },
    ]
}

/// How weapon upgrades scale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    pub damage_growth: f32,
    pub cooldown_factor: f64,
    pub knockback_growth: f32,
    /// Cards shown per level-up
    pub choices: usize,
    /// Probability a card slot prefers upgrading an owned weapon
    pub upgrade_bias: f64,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            damage_growth: 1.2,
            cooldown_factor: 0.9,
            knockback_growth: 1.05,
            choices: 3,
            upgrade_bias: 0.8,
        }
    }
}

/// One difficulty tier of the enemy director
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Elapsed run time at which this stage begins
    pub start_secs: f32,
    /// HP multiplier for enemies spawned during the stage
    pub difficulty: f32,
    /// Steps between spawn events
    pub spawn_interval: u32,
    /// Enemies per spawn event
    pub batch: u32,
    /// Archetype weights: basic, fast, tank
    pub weights: [f32; 3],
}

impl Stage {
    /// Enemies per step
    pub fn pressure(&self) -> f32 {
        self.batch as f32 / self.spawn_interval.max(1) as f32
    }
}

/// Spawn schedule and run length
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    pub stages: Vec<Stage>,
    /// Surviving this long wins the run and stops spawning
    pub win_secs: f32,
    /// One boss appears when elapsed time first reaches this
    pub boss_at_secs: Option<f32>,
    pub spawn_margin: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        let stage = |start_secs, difficulty, spawn_interval, batch, weights| Stage {
            start_secs,
            difficulty,
            spawn_interval,
            batch,
            weights,
        };
        Self {
            stages: vec![
                stage(0.0, 1.0, 120, 1, [1.0, 0.0, 0.0]),
                stage(60.0, 1.2, 110, 1, [0.7, 0.3, 0.0]),
                stage(120.0, 1.4, 100, 1, [0.7, 0.3, 0.0]),
                stage(180.0, 1.6, 90, 2, [0.63, 0.27, 0.1]),
                stage(240.0, 1.8, 80, 2, [0.55, 0.3, 0.15]),
            ],
            win_secs: 300.0,
            boss_at_secs: Some(240.0),
            spawn_margin: SPAWN_MARGIN,
        }
    }
}

/// Collision and reward constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub grid_cell_size: f32,
    pub projectile_radius: f32,
    pub parallel_spacing: f32,
    pub base_knockback: f32,
    pub knockback_decay: f32,
    pub explosion_knockback_scale: f32,
    pub pickup_accel: f32,
    pub gold_drop_value: u32,
    pub gold_drop_offset: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            grid_cell_size: GRID_CELL_SIZE,
            projectile_radius: PROJECTILE_RADIUS,
            parallel_spacing: PARALLEL_SPACING,
            base_knockback: BASE_KNOCKBACK,
            knockback_decay: KNOCKBACK_DECAY,
            explosion_knockback_scale: EXPLOSION_KNOCKBACK_SCALE,
            pickup_accel: PICKUP_ACCEL_PER_STEP,
            gold_drop_value: GOLD_DROP_VALUE,
            gold_drop_offset: GOLD_DROP_OFFSET,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: Bounds,
    pub player: PlayerTuning,
    pub enemies: EnemyRoster,
    pub arsenal: Vec<WeaponSpec>,
    pub starting_weapon: WeaponKind,
    pub upgrades: UpgradeTuning,
    pub director: DirectorTuning,
    pub combat: CombatTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world: Bounds::default(),
            player: PlayerTuning::default(),
            enemies: EnemyRoster::default(),
            arsenal: default_arsenal(),
            starting_weapon: WeaponKind::Blaster,
            upgrades: UpgradeTuning::default(),
            director: DirectorTuning::default(),
            combat: CombatTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: {} weapons, {} stages, win at {}s",
            tuning.arsenal.len(),
            tuning.director.stages.len(),
            tuning.director.win_secs
        );
        Ok(tuning)
    }

    /// Look up the base template of a weapon
    pub fn weapon(&self, kind: WeaponKind) -> Option<&WeaponSpec> {
        self.arsenal.iter().find(|w| w.kind == kind)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let stages = &self.director.stages;
        if stages.is_empty() {
            return Err(TuningError::NoStages);
        }
        for (index, pair) in stages.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_secs < prev.start_secs {
                return Err(TuningError::UnsortedStages {
                    index: index + 1,
                    start_secs: next.start_secs,
                });
            }
            if next.pressure() < prev.pressure() {
                return Err(TuningError::DecreasingPressure { index: index + 1 });
            }
        }
        if let Some(index) = stages
            .iter()
            .position(|s| !s.weights.iter().any(|&w| w > 0.0))
        {
            return Err(TuningError::EmptyWeights { index });
        }

        let radius = self
            .enemies
            .largest_radius()
            .max(self.player.radius)
            .max(self.combat.projectile_radius);
        if self.combat.grid_cell_size < radius {
            return Err(TuningError::CellTooSmall {
                cell_size: self.combat.grid_cell_size,
                radius,
            });
        }

        let decay = self.combat.knockback_decay;
        if !(decay > 0.0 && decay < 1.0) {
            return Err(TuningError::KnockbackDecay(decay));
        }
        if self.weapon(self.starting_weapon).is_none() {
            return Err(TuningError::MissingStartingWeapon(self.starting_weapon));
        }
        if self.director.win_secs <= 0.0 {
            return Err(TuningError::WinTime(self.director.win_secs));
        }
        Ok(())
    }
}
