//! Error types shared by the simulation, config loading and counters.

use thiserror::Error;

/// Errors surfaced by the crate.
///
/// Death is not an error: it is a phase of the simulation (see
/// [`crate::sim::GamePhase::Dead`]).
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is out of range. Raised at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// No free cell is left for an apple or pickup.
    #[error("no free cell available for spawning")]
    NoFreeCell,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
