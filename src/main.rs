//! Cell Survival headless runner
//!
//! `cell-survival [seed] [tuning.json]` plays one run on autopilot, picking
//! the first card at every level-up, and logs the outcome. Useful for
//! balancing a tuning file without a browser.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use cell_survival::consts::STEP_MS;
    use cell_survival::platform::GoldLedger;
    use cell_survival::sim::{Arena, TickInput, tick};
    use cell_survival::{MetaProgress, MetaUpgrade, Tuning, TuningError};
    use thiserror::Error;

    const DEFAULT_SEED: u64 = 42;
    /// Progress line every 30 simulated seconds
    const REPORT_EVERY_STEPS: u64 = 30 * 60;

    #[derive(Debug, Error)]
    pub enum RunnerError {
        #[error("invalid seed {0:?}")]
        Seed(String),
        #[error("cannot read {path}: {source}")]
        Io {
            path: String,
            source: std::io::Error,
        },
        #[error(transparent)]
        Tuning(#[from] TuningError),
    }

    fn load_tuning(path: &str) -> Result<Tuning, RunnerError> {
        let json = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(Tuning::from_json(&json)?)
    }

    pub fn run() -> Result<(), RunnerError> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(raw) => raw.parse::<u64>().map_err(|_| RunnerError::Seed(raw))?,
            None => DEFAULT_SEED,
        };
        let tuning = match args.next() {
            Some(path) => load_tuning(&path)?,
            None => Tuning::default(),
        };

        // Hard stop well past the win time, in case a custom tuning stalls
        let max_steps = ((tuning.director.win_secs as f64 + 60.0) * 1000.0 / STEP_MS) as u64;

        let mut meta = MetaProgress::default();
        let mut arena = Arena::new(seed, tuning);
        arena.start_run(&meta);
        log::info!("Headless run with seed {}", seed);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for frame in 0..max_steps {
            if let Some(&first) = arena.level_up_offers().and_then(|offers| offers.first()) {
                log::info!("Autopick: {}", first.title());
                arena.choose_upgrade(&first);
            }

            let snapshot = tick(&mut arena, &input, STEP_MS);
            if frame % REPORT_EVERY_STEPS == 0 {
                log::info!(
                    "t={:.0}s hp={:.0}/{:.0} level={} kills={} enemies={}",
                    snapshot.elapsed_seconds,
                    snapshot.hp,
                    snapshot.max_hp,
                    snapshot.level,
                    snapshot.kills,
                    arena.enemies.len()
                );
            }
            arena.drain_events();

            if arena.outcome().ended {
                break;
            }
        }

        let outcome = arena.outcome();
        GoldLedger::default().close_run(&arena, &mut meta);
        log::info!(
            "{} after {:.1}s: level {}, {} kills, {} gold",
            if outcome.won { "Victory" } else { "Defeat" },
            outcome.elapsed_seconds,
            outcome.level,
            outcome.kills,
            outcome.gold_earned
        );
        for item in MetaUpgrade::ALL {
            log::info!(
                "  shop: {:<12} {:>5} gold{}",
                item.display_name(),
                meta.cost(item),
                if meta.cost(item) <= meta.gold { " (affordable)" } else { "" }
            );
        }
        println!("{}", cell_survival::platform::to_json(&outcome));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cell Survival (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
