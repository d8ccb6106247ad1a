//! Snake Chain - a grid Snake simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, chains, powerups)
//! - `settings`: Data-driven game configuration and presets
//! - `economy`: Persisted coin and best-score counters
//! - `error`: Error types

pub mod economy;
pub mod error;
pub mod settings;
pub mod sim;

pub use economy::Economy;
pub use error::{SimError, SimResult};
pub use settings::{GameConfig, Mode};
pub use sim::{Cell, Direction, GameEvent, GamePhase, PowerupKind, Simulation};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
    /// Maximum steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board defaults (cells span -border..=border, a 19x11 board)
    pub const BORDER_X: i32 = 9;
    pub const BORDER_Y: i32 = 5;

    /// Snake defaults
    pub const START_LENGTH: usize = 4;
    pub const STEP_TIME_START: f32 = 0.14;
    pub const STEP_TIME_MIN: f32 = 0.08;
    pub const STEP_REDUCTION_PER_CHAIN: f32 = 0.012;

    /// Chain combo defaults
    pub const CHAIN_MAX: u32 = 5;
    pub const CHAIN_WINDOW_BASE: f32 = 1.7;
    pub const CHAIN_WINDOW_PER_CELL: f32 = 0.035;
    pub const CHAIN_WINDOW_CAP: f32 = 2.6;

    /// Apple placement
    pub const APPLE_SPAWN_ATTEMPTS: u32 = 300;
    /// Cells directly ahead of the head that never receive an apple
    pub const APPLE_SAFE_AHEAD: i32 = 2;
    pub const GOLD_CHANCE: f32 = 0.10;
    pub const GOLD_MIN_CHAIN: u32 = 5;

    /// Fever: this many consecutive max-chain apples light it up
    pub const FEVER_STREAK: u32 = 3;
    pub const FEVER_DURATION: f32 = 8.0;

    /// Powerups
    pub const POWERUP_DURATION: f32 = 8.0;
    /// Used when a powerup is activated with a non-positive duration
    pub const POWERUP_FALLBACK_DURATION: f32 = 5.0;
    pub const POWERUP_SPAWN_MIN: f32 = 6.0;
    pub const POWERUP_SPAWN_MAX: f32 = 10.0;
    pub const POWERUP_SPAWN_ATTEMPTS: u32 = 50;
    pub const POWERUP_MAX_ACTIVE: usize = 1;
    pub const STASH_SLOTS: usize = 3;
    pub const STASH_STACK_LIMIT: u32 = 1;
    pub const FREEZE_STEP_MULTIPLIER: f32 = 0.5;
    pub const FREEZE_TIME_SCALE: f32 = 0.5;
    pub const FREEZE_SPAWN_INTERVAL_SCALE: f32 = 2.0;
    pub const MAGNET_RADIUS: i32 = 3;
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a - b).abs().element_sum()
}

/// Chebyshev (king-move) distance between two cells
#[inline]
pub fn chebyshev(a: Cell, b: Cell) -> i32 {
    (a - b).abs().max_element()
}
