//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete steps driven by a fixed-interval accumulator
//! - Seeded RNG only
//! - Stable iteration order (ordered maps, pickups by id)
//! - No rendering or platform dependencies

pub mod apple;
pub mod autopilot;
pub mod chain;
pub mod clock;
pub mod effects;
pub mod grid;
pub mod obstacles;
pub mod occupancy;
pub mod powerups;
pub mod state;
pub mod tick;

pub use apple::{Apple, AppleManager};
pub use chain::{ChainTimer, FeverChange, FeverMeter};
pub use clock::SimClock;
pub use effects::{ActiveEffects, PowerupKind};
pub use grid::{Board, Cell, Direction};
pub use obstacles::ObstacleRegistry;
pub use occupancy::Occupancy;
pub use powerups::{Pickup, PowerupSpawner, PowerupStash, StashSlot};
pub use state::{DeathCause, GameEvent, GamePhase, Simulation};
pub use tick::{TickInput, step, tick};
