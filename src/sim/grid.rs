//! Board geometry: bounds, wraparound and directions on the integer grid

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A grid position. Cells are plain values with no identity.
pub type Cell = IVec2;

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step for this direction (+y is up)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::Y,
            Direction::Down => IVec2::NEG_Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_reverse_of(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Board bounds and wrap behaviour.
///
/// Cells span `-border_x..=border_x` by `-border_y..=border_y`, centered on
/// the origin. The reserved rows are HUD space: the snake may move through
/// them but items never spawn there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    pub border_x: i32,
    pub border_y: i32,
    pub wrap: bool,
    pub tile_size: f32,
    pub reserved_top_rows: i32,
    pub reserved_bottom_rows: i32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            border_x: crate::consts::BORDER_X,
            border_y: crate::consts::BORDER_Y,
            wrap: true,
            tile_size: 1.0,
            reserved_top_rows: 0,
            reserved_bottom_rows: 0,
        }
    }
}

impl Board {
    pub fn new(border_x: i32, border_y: i32, wrap: bool) -> Self {
        Self {
            border_x,
            border_y,
            wrap,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.border_x < 0 || self.border_y < 0 {
            return Err(SimError::InvalidConfig("board borders must be non-negative"));
        }
        if self.tile_size <= 0.0 {
            return Err(SimError::InvalidConfig("tile_size must be positive"));
        }
        if self.reserved_top_rows < 0 || self.reserved_bottom_rows < 0 {
            return Err(SimError::InvalidConfig("reserved rows must be non-negative"));
        }
        if self.play_bottom() > self.play_top() {
            return Err(SimError::InvalidConfig(
                "reserved rows leave no playable area",
            ));
        }
        Ok(())
    }

    /// Number of columns
    pub fn width(&self) -> i32 {
        self.border_x * 2 + 1
    }

    /// Number of rows
    pub fn height(&self) -> i32 {
        self.border_y * 2 + 1
    }

    pub fn cell_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    pub fn in_bounds(&self, c: Cell) -> bool {
        c.x >= -self.border_x && c.x <= self.border_x && c.y >= -self.border_y && c.y <= self.border_y
    }

    /// Move an out-of-range coordinate to the opposite edge, per axis
    pub fn wrap(&self, mut c: Cell) -> Cell {
        if c.x < -self.border_x {
            c.x = self.border_x;
        } else if c.x > self.border_x {
            c.x = -self.border_x;
        }
        if c.y < -self.border_y {
            c.y = self.border_y;
        } else if c.y > self.border_y {
            c.y = -self.border_y;
        }
        c
    }

    /// Neighbour of `c` in `dir`, wrapped when the board wraps.
    /// Returns `None` when the step leaves a non-wrapping board.
    pub fn step(&self, c: Cell, dir: Direction) -> Option<Cell> {
        let next = c + dir.delta();
        if self.in_bounds(next) {
            Some(next)
        } else if self.wrap {
            Some(self.wrap(next))
        } else {
            None
        }
    }

    /// Lowest row items may spawn on
    pub fn play_bottom(&self) -> i32 {
        -self.border_y + self.reserved_bottom_rows
    }

    /// Highest row items may spawn on
    pub fn play_top(&self) -> i32 {
        self.border_y - self.reserved_top_rows
    }

    pub fn in_play_area(&self, c: Cell) -> bool {
        c.x >= -self.border_x && c.x <= self.border_x && c.y >= self.play_bottom() && c.y <= self.play_top()
    }

    /// Play-area cells in scan order: rows bottom to top, columns left to right
    pub fn play_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.play_bottom()..=self.play_top())
            .flat_map(move |y| (-self.border_x..=self.border_x).map(move |x| Cell::new(x, y)))
    }

    /// World-space center of a cell, for presentation adapters
    pub fn cell_to_world(&self, c: Cell) -> Vec2 {
        c.as_vec2() * self.tile_size
    }
}
