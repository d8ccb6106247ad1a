//! Persistent coin and best-score counters
//!
//! Stored as a small JSON file, fed from simulation events.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::sim::GameEvent;

/// Counters that outlive a single run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    pub total_coins: u64,
    pub best_score: u64,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the counter side of an event: apple coins, and the final score
    /// when the snake dies. Returns true if a new best was set.
    pub fn record(&mut self, event: &GameEvent) -> bool {
        match *event {
            GameEvent::AppleEaten { coins_delta, .. } => {
                self.add_coins(coins_delta);
                false
            }
            GameEvent::Died { score, .. } => self.try_set_best(score),
            _ => false,
        }
    }

    pub fn add_coins(&mut self, coins: u32) {
        self.total_coins = self.total_coins.saturating_add(u64::from(coins));
    }

    /// Keep `score` if it beats the best. Returns true when it did.
    pub fn try_set_best(&mut self, score: u64) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Load counters from `path`; a missing file starts fresh
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let economy: Self = serde_json::from_str(&json)?;
                log::info!(
                    "Loaded economy: {} coins, best {}",
                    economy.total_coins,
                    economy.best_score
                );
                Ok(economy)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No economy file at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!(
            "Economy saved ({} coins, best {})",
            self.total_coins,
            self.best_score
        );
        Ok(())
    }
}
