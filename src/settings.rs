//! Game configuration and presets
//!
//! Loaded from JSON (missing fields fall back to defaults) and validated
//! before a simulation is built. Invalid values are rejected, never clamped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::sim::{Board, Cell, PowerupKind};

/// Game mode presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Wrapping board, standard pace
    #[default]
    Classic,
    /// Walls are solid and the run starts slower
    Forest,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Classic => "Classic",
            Mode::Forest => "Forest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Mode::Classic),
            "forest" => Some(Mode::Forest),
            _ => None,
        }
    }

    /// Whether the board wraps in this mode
    pub fn wraps(&self) -> bool {
        match self {
            Mode::Classic => true,
            Mode::Forest => false,
        }
    }

    /// Step interval at chain level 1
    pub fn start_step_time(&self) -> f32 {
        match self {
            Mode::Classic => STEP_TIME_START,
            Mode::Forest => 0.18,
        }
    }
}

/// Snake start state and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub start_length: usize,
    /// Head cell at reset; the body extends to the left of it
    pub start: Cell,
    pub step_time_start: f32,
    pub step_time_min: f32,
    /// Step interval shaved off per chain level above 1
    pub step_reduction_per_chain: f32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            start_length: START_LENGTH,
            start: Cell::ZERO,
            step_time_start: STEP_TIME_START,
            step_time_min: STEP_TIME_MIN,
            step_reduction_per_chain: STEP_REDUCTION_PER_CHAIN,
        }
    }
}

/// Chain combo and fever tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub max_level: u32,
    pub window_base: f32,
    pub window_per_cell: f32,
    pub window_cap: f32,
    pub fever_streak: u32,
    pub fever_duration: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_level: CHAIN_MAX,
            window_base: CHAIN_WINDOW_BASE,
            window_per_cell: CHAIN_WINDOW_PER_CELL,
            window_cap: CHAIN_WINDOW_CAP,
            fever_streak: FEVER_STREAK,
            fever_duration: FEVER_DURATION,
        }
    }
}

/// Apple placement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppleConfig {
    pub spawn_attempts: u32,
    pub safe_ahead: i32,
    pub gold_chance: f32,
    pub gold_min_chain: u32,
}

impl Default for AppleConfig {
    fn default() -> Self {
        Self {
            spawn_attempts: APPLE_SPAWN_ATTEMPTS,
            safe_ahead: APPLE_SAFE_AHEAD,
            gold_chance: GOLD_CHANCE,
            gold_min_chain: GOLD_MIN_CHAIN,
        }
    }
}

/// Relative spawn weight and duration for one powerup kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerupDef {
    pub kind: PowerupKind,
    pub weight: u32,
    pub duration: f32,
}

/// Powerup spawning, stash and effect tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub auto_spawn: bool,
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,
    pub spawn_attempts: u32,
    /// Pickups allowed on the board at once (0 = unlimited)
    pub max_active: usize,
    pub table: Vec<PowerupDef>,
    /// When false, pickups activate immediately instead of being stashed
    pub stash_enabled: bool,
    pub stash_slots: usize,
    /// Copies of one kind a stash slot may hold (0 = unlimited)
    pub stash_stack_limit: u32,
    pub freeze_step_multiplier: f32,
    pub freeze_time_scale: f32,
    pub freeze_spawn_interval_scale: f32,
    pub magnet_radius: i32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        let table = PowerupKind::ALL
            .iter()
            .map(|&kind| PowerupDef {
                kind,
                weight: 1,
                duration: POWERUP_DURATION,
            })
            .collect();
        Self {
            auto_spawn: true,
            spawn_interval_min: POWERUP_SPAWN_MIN,
            spawn_interval_max: POWERUP_SPAWN_MAX,
            spawn_attempts: POWERUP_SPAWN_ATTEMPTS,
            max_active: POWERUP_MAX_ACTIVE,
            table,
            stash_enabled: true,
            stash_slots: STASH_SLOTS,
            stash_stack_limit: STASH_STACK_LIMIT,
            freeze_step_multiplier: FREEZE_STEP_MULTIPLIER,
            freeze_time_scale: FREEZE_TIME_SCALE,
            freeze_spawn_interval_scale: FREEZE_SPAWN_INTERVAL_SCALE,
            magnet_radius: MAGNET_RADIUS,
        }
    }
}

impl PowerupConfig {
    /// Configured duration for `kind`, falling back to the default
    pub fn duration(&self, kind: PowerupKind) -> f32 {
        self.table
            .iter()
            .find(|d| d.kind == kind)
            .map(|d| d.duration)
            .unwrap_or(POWERUP_DURATION)
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: Mode,
    /// Run seed for reproducibility
    pub seed: u64,
    pub board: Board,
    pub snake: SnakeConfig,
    pub chain: ChainConfig,
    pub apple: AppleConfig,
    pub powerups: PowerupConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Classic,
            seed: 0,
            board: Board::default(),
            snake: SnakeConfig::default(),
            chain: ChainConfig::default(),
            apple: AppleConfig::default(),
            powerups: PowerupConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a config from a mode preset (applies preset defaults)
    pub fn from_mode(mode: Mode) -> Self {
        let mut config = Self::default();
        config.apply_mode(mode);
        config
    }

    /// Apply a mode preset (updates mode-dependent settings)
    pub fn apply_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.board.wrap = mode.wraps();
        self.snake.step_time_start = mode.start_step_time();
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> SimResult<()> {
        self.board.validate()?;

        let snake = &self.snake;
        if snake.start_length < 1 {
            return Err(SimError::InvalidConfig("start_length must be at least 1"));
        }
        if snake.start_length > self.board.width() as usize {
            return Err(SimError::InvalidConfig(
                "start_length does not fit in one board row",
            ));
        }
        if !self.board.in_bounds(snake.start) {
            return Err(SimError::InvalidConfig("snake start cell is off the board"));
        }
        if !self
            .board
            .in_bounds(snake.start - Cell::new(snake.start_length as i32 - 1, 0))
        {
            return Err(SimError::InvalidConfig("snake body leaves the board at start"));
        }
        if snake.step_time_start <= 0.0 || snake.step_time_min <= 0.0 {
            return Err(SimError::InvalidConfig("step times must be positive"));
        }
        if snake.step_time_min > snake.step_time_start {
            return Err(SimError::InvalidConfig(
                "step_time_min must not exceed step_time_start",
            ));
        }
        if snake.step_reduction_per_chain < 0.0 {
            return Err(SimError::InvalidConfig(
                "step_reduction_per_chain must be non-negative",
            ));
        }

        let chain = &self.chain;
        if chain.max_level < 1 {
            return Err(SimError::InvalidConfig("chain max_level must be at least 1"));
        }
        if chain.window_base < 0.0 || chain.window_per_cell < 0.0 {
            return Err(SimError::InvalidConfig("chain windows must be non-negative"));
        }
        if chain.window_cap < chain.window_base {
            return Err(SimError::InvalidConfig(
                "chain window_cap must not be below window_base",
            ));
        }
        if chain.fever_duration < 0.0 {
            return Err(SimError::InvalidConfig("fever_duration must be non-negative"));
        }

        let apple = &self.apple;
        if !(0.0..=1.0).contains(&apple.gold_chance) {
            return Err(SimError::InvalidConfig("gold_chance must be within [0, 1]"));
        }
        if apple.safe_ahead < 0 {
            return Err(SimError::InvalidConfig("safe_ahead must be non-negative"));
        }

        let powerups = &self.powerups;
        if powerups.spawn_interval_min <= 0.0 {
            return Err(SimError::InvalidConfig(
                "powerup spawn_interval_min must be positive",
            ));
        }
        if powerups.spawn_interval_max < powerups.spawn_interval_min {
            return Err(SimError::InvalidConfig(
                "powerup spawn_interval_max must not be below spawn_interval_min",
            ));
        }
        if powerups.auto_spawn && powerups.table.iter().all(|d| d.weight == 0) {
            return Err(SimError::InvalidConfig(
                "powerup table needs at least one positive weight",
            ));
        }
        if powerups.freeze_step_multiplier <= 0.0 || powerups.freeze_time_scale <= 0.0 {
            return Err(SimError::InvalidConfig("freeze multipliers must be positive"));
        }
        if powerups.freeze_spawn_interval_scale <= 0.0 {
            return Err(SimError::InvalidConfig(
                "freeze_spawn_interval_scale must be positive",
            ));
        }
        if powerups.magnet_radius < 0 {
            return Err(SimError::InvalidConfig("magnet_radius must be non-negative"));
        }

        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} config from {}", config.mode.as_str(), path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
