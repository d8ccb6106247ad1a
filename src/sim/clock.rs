//! Simulation clocks

use serde::{Deserialize, Serialize};

/// Real and world time, in seconds since the run started.
///
/// Real time follows the host frames one to one. World time is scaled by
/// `time_scale` (Freeze halves it) and drives chain windows, fever and pickup
/// spawn timers. Effect countdowns use real time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    pub real: f32,
    pub world: f32,
    pub time_scale: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            real: 0.0,
            world: 0.0,
            time_scale: 1.0,
        }
    }
}

impl SimClock {
    /// Advance by `dt` real seconds. Returns the world delta.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let world_dt = dt * self.time_scale;
        self.real += dt;
        self.world += world_dt;
        world_dt
    }
}
