//! Blocked cells (forest columns, walls placed by the host)

use std::collections::HashSet;

use super::grid::Cell;

/// Registry of blocked cells, owned by the simulation.
///
/// Hosts register and clear cells; the step function queries
/// [`is_blocked`](Self::is_blocked) and a Shield contact removes the entry
/// through [`consume`](Self::consume).
#[derive(Debug, Clone, Default)]
pub struct ObstacleRegistry {
    cells: HashSet<Cell>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self, c: Cell) -> bool {
        self.cells.contains(&c)
    }

    pub fn register(&mut self, c: Cell) {
        self.cells.insert(c);
    }

    /// Mark or unmark a cell (moving obstacles flip cells as they drift)
    pub fn set_blocked(&mut self, c: Cell, blocked: bool) {
        if blocked {
            self.cells.insert(c);
        } else {
            self.cells.remove(&c);
        }
    }

    /// Remove the obstacle at `c`. Returns whether one was there.
    pub fn consume(&mut self, c: Cell) -> bool {
        self.cells.remove(&c)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
