//! Enemy director: spawn schedule and difficulty curve
//!
//! Elapsed run time selects a stage; the stage decides how often enemies
//! arrive, how many per batch, how tough they are and which archetypes are
//! likely. Once the win time is reached the director stops spawning.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use crate::Bounds;
use crate::tuning::{DirectorTuning, EnemyRoster, Stage};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Director {
    /// Steps since the run started
    pub elapsed_steps: u64,
    /// Steps since the last spawn event
    pub spawn_timer: u32,
    pub stage_index: usize,
    pub boss_spawned: bool,
    finished: bool,
}

impl Director {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the terminal threshold has been reached; no more spawns follow
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index of the last stage whose start time has passed
    fn stage_for(tuning: &DirectorTuning, elapsed_secs: f32) -> usize {
        tuning
            .stages
            .iter()
            .rposition(|s| s.start_secs <= elapsed_secs)
            .unwrap_or(0)
    }

    /// Advance one step and return the enemies to add this step
    #[allow(clippy::too_many_arguments)]
    pub fn update<R: Rng>(
        &mut self,
        elapsed_secs: f32,
        tuning: &DirectorTuning,
        roster: &EnemyRoster,
        bounds: Bounds,
        rng: &mut R,
        next_id: &mut u32,
    ) -> Vec<Enemy> {
        if self.finished {
            return Vec::new();
        }
        if elapsed_secs >= tuning.win_secs {
            self.finished = true;
            log::info!("Director finished at {:.1}s", elapsed_secs);
            return Vec::new();
        }
        self.elapsed_steps += 1;

        let index = Self::stage_for(tuning, elapsed_secs);
        if index != self.stage_index {
            self.stage_index = index;
            log::info!("Entering stage {} at {:.1}s", index, elapsed_secs);
        }
        let Some(stage) = tuning.stages.get(index) else {
            return Vec::new();
        };

        let mut spawned = Vec::new();

        let boss_due = tuning.boss_at_secs.is_some_and(|at| elapsed_secs >= at);
        if boss_due && !self.boss_spawned {
            self.boss_spawned = true;
            let pos = edge_position(bounds, tuning.spawn_margin, rng);
            spawned.push(Enemy::spawn(
                take_id(next_id),
                EnemyKind::Boss,
                roster.get(EnemyKind::Boss),
                pos,
                stage.difficulty,
            ));
            log::info!("Boss incoming at {:.1}s", elapsed_secs);
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= stage.spawn_interval {
            self.spawn_timer = 0;
            for _ in 0..stage.batch {
                let kind = pick_kind(stage, rng);
                let pos = edge_position(bounds, tuning.spawn_margin, rng);
                spawned.push(Enemy::spawn(
                    take_id(next_id),
                    kind,
                    roster.get(kind),
                    pos,
                    stage.difficulty,
                ));
            }
            log::debug!(
                "Spawned batch of {} (stage {}, x{:.1} hp)",
                stage.batch,
                index,
                stage.difficulty
            );
        }

        spawned
    }
}

fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

/// Weighted archetype choice for a stage
pub fn pick_kind<R: Rng>(stage: &Stage, rng: &mut R) -> EnemyKind {
    match WeightedIndex::new(stage.weights) {
        Ok(dist) => EnemyKind::WEIGHTED[dist.sample(rng)],
        Err(_) => EnemyKind::Basic,
    }
}

/// A point just outside the playfield, on an edge chosen uniformly
pub fn edge_position<R: Rng>(bounds: Bounds, margin: f32, rng: &mut R) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(-margin, rng.random_range(0.0..=bounds.height)),
        1 => Vec2::new(bounds.width + margin, rng.random_range(0.0..=bounds.height)),
        2 => Vec2::new(rng.random_range(0.0..=bounds.width), -margin),
        _ => Vec2::new(rng.random_range(0.0..=bounds.width), bounds.height + margin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STEP_SECS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_for(director: &mut Director, tuning: &DirectorTuning, steps: u32) -> Vec<Enemy> {
        let roster = EnemyRoster::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut next_id = 1;
        let mut all = Vec::new();
        for _ in 0..steps {
            let secs = (director.elapsed_steps + 1) as f32 * STEP_SECS;
            all.extend(director.update(
                secs,
                tuning,
                &roster,
                Bounds::default(),
                &mut rng,
                &mut next_id,
            ));
        }
        all
    }

    #[test]
    fn test_first_stage_cadence() {
        let tuning = DirectorTuning::default();
        let mut d = Director::new();
        // 120-step interval: one spawn per two seconds
        let spawned = run_for(&mut d, &tuning, 600);
        assert_eq!(spawned.len(), 5);
        assert!(spawned.iter().all(|e| e.kind == EnemyKind::Basic));
        assert!(spawned.iter().all(|e| e.hp == 15.0));
    }

    #[test]
    fn test_spawns_outside_bounds() {
        let tuning = DirectorTuning::default();
        let mut d = Director::new();
        let bounds = Bounds::default();
        for e in run_for(&mut d, &tuning, 1200) {
            assert!(!bounds.contains(e.pos), "spawned inside at {:?}", e.pos);
        }
    }

    #[test]
    fn test_ids_unique() {
        let tuning = DirectorTuning::default();
        let mut d = Director::new();
        let spawned = run_for(&mut d, &tuning, 1200);
        let mut ids: Vec<u32> = spawned.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), spawned.len());
    }

    #[test]
    fn test_later_stage_is_tougher() {
        let tuning = DirectorTuning::default();
        let roster = EnemyRoster::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut next_id = 1;
        let mut d = Director::new();
        let mut spawned = Vec::new();
        for step in 0..2000u32 {
            spawned.extend(d.update(
                200.0 + step as f32 * STEP_SECS,
                &tuning,
                &roster,
                Bounds::default(),
                &mut rng,
                &mut next_id,
            ));
        }
        assert_eq!(d.stage_index, 3);
        // Stage 3 batches two at a time, every 90 steps
        assert_eq!(spawned.len(), 2 * (2000 / 90));
        assert!(spawned.iter().all(|e| e.max_hp >= roster.get(e.kind).hp * 1.6 - 1e-3));
        assert!(spawned.iter().any(|e| e.kind != EnemyKind::Basic));
    }

    #[test]
    fn test_boss_spawns_once() {
        let tuning = DirectorTuning::default();
        let roster = EnemyRoster::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut next_id = 1;
        let mut d = Director::new();
        let mut bosses = 0;
        for step in 0..600u32 {
            let secs = 239.0 + step as f32 * STEP_SECS;
            bosses += d
                .update(secs, &tuning, &roster, Bounds::default(), &mut rng, &mut next_id)
                .iter()
                .filter(|e| e.kind == EnemyKind::Boss)
                .count();
        }
        assert_eq!(bosses, 1);
    }

    #[test]
    fn test_stops_at_win_time() {
        let tuning = DirectorTuning::default();
        let roster = EnemyRoster::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut next_id = 1;
        let mut d = Director::new();
        let spawned = d.update(300.0, &tuning, &roster, Bounds::default(), &mut rng, &mut next_id);
        assert!(spawned.is_empty());
        assert!(d.is_finished());
        for _ in 0..500 {
            assert!(
                d.update(1.0, &tuning, &roster, Bounds::default(), &mut rng, &mut next_id)
                    .is_empty()
            );
        }
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_basic() {
        let stage = Stage {
            start_secs: 0.0,
            difficulty: 1.0,
            spawn_interval: 1,
            batch: 1,
            weights: [0.0, 0.0, 0.0],
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(pick_kind(&stage, &mut rng), EnemyKind::Basic);
    }
}
