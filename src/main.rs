//! Snake Chain - headless demo
//!
//! Runs the autopilot against the simulation at a fixed 60 Hz frame rate,
//! printing every event as a JSON line and keeping the coin/best-score
//! counters on disk.
//!
//! Usage: `snake-chain [config.json] [seconds]`

use snake_chain::sim::{TickInput, tick};
use snake_chain::{Economy, GameConfig, GameEvent, SimResult, Simulation};

/// Host frame length
const FRAME_DT: f32 = 1.0 / 60.0;
/// Default demo length in simulated seconds
const DEFAULT_SECONDS: f32 = 60.0;
const ECONOMY_FILE: &str = "snake-chain-economy.json";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    log::info!(
        "Snake Chain starting: {} mode, seed {}, {:.0}s",
        config.mode.as_str(),
        config.seed,
        seconds
    );

    let mut economy = Economy::load(ECONOMY_FILE)?;
    let mut sim = Simulation::new(config)?;
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let frames = (seconds / FRAME_DT) as u32;
    let mut runs = 1;
    for _ in 0..frames {
        tick(&mut sim, &input, FRAME_DT);

        for event in sim.drain_events() {
            if economy.record(&event) {
                log::info!("New best score: {}", economy.best_score);
            }
            println!("{}", serde_json::to_string(&event)?);
            if let GameEvent::PowerupCollected { kind } = event {
                // The demo spends pickups as soon as it gets them
                sim.use_powerup(kind);
            }
        }

        if sim.is_dead() {
            sim.reset();
            runs += 1;
        }
    }

    log::info!(
        "Demo finished after {} runs: {} coins total, best {}",
        runs,
        economy.total_coins,
        economy.best_score
    );
    economy.save(ECONOMY_FILE)
}
