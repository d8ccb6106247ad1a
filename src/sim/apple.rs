//! Apple placement

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Board, Cell, Direction};
use super::occupancy::Occupancy;
use crate::error::{SimError, SimResult};
use crate::settings::AppleConfig;

/// The apple currently on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apple {
    pub cell: Cell,
    pub is_gold: bool,
}

/// Owns the apple and picks free cells for it
#[derive(Debug, Clone)]
pub struct AppleManager {
    current: Option<Apple>,
    spawn_attempts: u32,
    safe_ahead: i32,
    gold_chance: f32,
    gold_min_chain: u32,
}

impl AppleManager {
    pub fn new(config: &AppleConfig) -> Self {
        Self {
            current: None,
            spawn_attempts: config.spawn_attempts,
            safe_ahead: config.safe_ahead,
            gold_chance: config.gold_chance,
            gold_min_chain: config.gold_min_chain,
        }
    }

    pub fn current(&self) -> Option<Apple> {
        self.current
    }

    pub fn cell(&self) -> Option<Cell> {
        self.current.map(|a| a.cell)
    }

    /// Whether the next apple should be gold at this chain level
    pub fn roll_gold(&self, rng: &mut impl Rng, chain_level: u32) -> bool {
        chain_level >= self.gold_min_chain && rng.random::<f32>() < self.gold_chance
    }

    /// Place a new apple on a free play-area cell.
    ///
    /// Random draws first, then a scan for the first free cell. The cells
    /// directly ahead of the head are never used so an apple cannot appear
    /// where the snake is about to be. `blocked` marks any other cell the
    /// caller wants kept clear (obstacles, pickups). On failure the board is
    /// left without an apple.
    #[allow(clippy::too_many_arguments)]
    pub fn try_spawn(
        &mut self,
        rng: &mut impl Rng,
        board: &Board,
        occupied: &Occupancy,
        blocked: impl Fn(Cell) -> bool,
        head: Cell,
        dir: Direction,
        is_gold: bool,
    ) -> SimResult<Cell> {
        let ahead: Vec<Cell> = (1..=self.safe_ahead)
            .map(|i| {
                let c = head + dir.delta() * i;
                if board.wrap { board.wrap(c) } else { c }
            })
            .collect();
        let is_free = |c: Cell| {
            !occupied.contains(c) && !blocked(c) && !ahead.contains(&c)
        };

        for _ in 0..self.spawn_attempts {
            let c = Cell::new(
                rng.random_range(-board.border_x..=board.border_x),
                rng.random_range(board.play_bottom()..=board.play_top()),
            );
            if is_free(c) {
                return Ok(self.place(c, is_gold));
            }
        }

        match board.play_cells().find(|&c| is_free(c)) {
            Some(c) => Ok(self.place(c, is_gold)),
            None => {
                self.current = None;
                Err(SimError::NoFreeCell)
            }
        }
    }

    pub(crate) fn place(&mut self, cell: Cell, is_gold: bool) -> Cell {
        self.current = Some(Apple { cell, is_gold });
        cell
    }

    /// Move the apple (magnet pull)
    pub fn nudge(&mut self, to: Cell) {
        if let Some(apple) = self.current.as_mut() {
            apple.cell = to;
        }
    }

    pub fn despawn(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::ObstacleRegistry;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn manager() -> AppleManager {
        AppleManager::new(&AppleConfig::default())
    }

    #[test]
    fn test_spawn_avoids_body_and_safety_buffer() {
        let board = Board::new(9, 5, true);
        let body = [Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)];
        let occupied = Occupancy::from_cells(&body);
        let mut apples = manager();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..500 {
            let c = apples
                .try_spawn(&mut rng, &board, &occupied, |_| false, body[0], Direction::Right, false)
                .unwrap();
            assert!(board.in_play_area(c));
            assert!(!occupied.contains(c));
            assert_ne!(c, Cell::new(1, 0));
            assert_ne!(c, Cell::new(2, 0));
        }
    }

    #[test]
    fn test_fallback_scan_finds_last_free_cell() {
        // 3x3 board, everything but one corner filled
        let board = Board::new(1, 1, false);
        let free = Cell::new(1, 1);
        let filled: Vec<Cell> = board.play_cells().filter(|&c| c != free).collect();
        let occupied = Occupancy::from_cells(&filled);
        let mut apples = AppleManager::new(&AppleConfig {
            spawn_attempts: 0,
            ..AppleConfig::default()
        });
        let mut rng = Pcg32::seed_from_u64(2);
        let c = apples
            .try_spawn(&mut rng, &board, &occupied, |_| false, Cell::new(-1, -1), Direction::Down, true)
            .unwrap();
        assert_eq!(c, free);
        assert_eq!(apples.current(), Some(Apple { cell: free, is_gold: true }));
    }

    #[test]
    fn test_full_board_reports_no_free_cell() {
        let board = Board::new(1, 1, true);
        let filled: Vec<Cell> = board.play_cells().collect();
        let occupied = Occupancy::from_cells(&filled);
        let mut apples = manager();
        let mut rng = Pcg32::seed_from_u64(3);
        let result = apples.try_spawn(
            &mut rng,
            &board,
            &occupied,
            |_| false,
            Cell::ZERO,
            Direction::Up,
            false,
        );
        assert!(matches!(result, Err(SimError::NoFreeCell)));
        assert_eq!(apples.current(), None);
    }

    #[test]
    fn test_spawn_skips_obstacles_and_reserved_rows() {
        let board = Board {
            reserved_top_rows: 1,
            ..Board::new(1, 1, true)
        };
        let mut obstacles = ObstacleRegistry::new();
        for c in board.play_cells() {
            if c != Cell::new(-1, -1) {
                obstacles.register(c);
            }
        }
        let mut apples = manager();
        let mut rng = Pcg32::seed_from_u64(4);
        let c = apples
            .try_spawn(&mut rng, &board, &Occupancy::new(), |c| obstacles.is_blocked(c), Cell::new(0, 1), Direction::Up, false)
            .unwrap();
        assert_eq!(c, Cell::new(-1, -1));
    }

    #[test]
    fn test_safety_buffer_wraps() {
        // Single row: head at the right edge facing right, buffer wraps to the left edge
        let board = Board::new(2, 0, true);
        let occupied = Occupancy::from_cells(&[Cell::new(2, 0)]);
        let mut apples = manager();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let c = apples
                .try_spawn(&mut rng, &board, &occupied, |_| false, Cell::new(2, 0), Direction::Right, false)
                .unwrap();
            assert!(c == Cell::new(0, 0) || c == Cell::new(1, 0));
        }
    }

    #[test]
    fn test_gold_gated_by_chain() {
        let apples = AppleManager::new(&AppleConfig {
            gold_chance: 1.0,
            ..AppleConfig::default()
        });
        let mut rng = Pcg32::seed_from_u64(6);
        assert!(!apples.roll_gold(&mut rng, 4));
        assert!(apples.roll_gold(&mut rng, 5));
    }

    #[test]
    fn test_blocked_cells_are_skipped() {
        // Single row of five; the head's buffer and the blocked cell leave one spot
        let board = Board::new(2, 0, true);
        let occupied = Occupancy::from_cells(&[Cell::new(-2, 0)]);
        let mut apples = manager();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            let c = apples
                .try_spawn(&mut rng, &board, &occupied, |c| c == Cell::new(1, 0), Cell::new(-2, 0), Direction::Right, false)
                .unwrap();
            assert_eq!(c, Cell::new(2, 0));
        }
    }
}
