//! Idle/demo steering
//!
//! Greedy: among the turns that do not kill the snake on the next step,
//! head for the apple (or a pickup when there is no apple), preferring
//! cells with more open neighbours and then the current heading.

use super::effects::PowerupKind;
use super::grid::{Cell, Direction};
use super::state::Simulation;
use crate::manhattan;

/// Pick a heading for the next step. `None` when every option is fatal.
pub fn choose_direction(sim: &Simulation) -> Option<Direction> {
    let head = sim.head();
    let target = sim
        .apple()
        .map(|a| a.cell)
        .or_else(|| sim.pickups().first().map(|p| p.cell));

    Direction::ALL
        .iter()
        .copied()
        .filter(|&dir| sim.body().len() < 2 || !dir.is_reverse_of(sim.direction()))
        .filter_map(|dir| {
            let next = sim.board().step(head, dir)?;
            is_safe(sim, next).then_some((dir, next))
        })
        .min_by_key(|&(dir, next)| {
            let distance = target.map(|t| manhattan(next, t)).unwrap_or(0);
            let cramped = 4 - open_neighbours(sim, next);
            let turn = i32::from(dir != sim.direction());
            (distance, cramped, turn)
        })
        .map(|(dir, _)| dir)
}

/// Whether moving onto `c` survives the step
fn is_safe(sim: &Simulation, c: Cell) -> bool {
    if sim.effects().is_active(PowerupKind::Ghost) {
        return true;
    }
    if sim.obstacles().is_blocked(c) && !sim.effects().is_active(PowerupKind::Shield) {
        return false;
    }
    if !sim.occupancy().contains(c) {
        return true;
    }
    // The tail cell frees up unless growth lands on it this step
    let tail = sim.body().last().copied();
    tail == Some(c) && sim.tail_vacates(sim.apple().map(|a| a.cell) == Some(c))
}

fn open_neighbours(sim: &Simulation, c: Cell) -> i32 {
    Direction::ALL
        .iter()
        .filter_map(|&d| sim.board().step(c, d))
        .filter(|&n| !sim.occupancy().contains(n) && !sim.obstacles().is_blocked(n))
        .count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::tick::step;

    fn sim() -> Simulation {
        let mut config = GameConfig::default();
        config.powerups.auto_spawn = false;
        Simulation::new(config).unwrap()
    }

    #[test]
    fn test_heads_for_apple() {
        let mut sim = sim();
        sim.place_apple(Cell::new(0, 4), false);
        assert_eq!(choose_direction(&sim), Some(Direction::Up));
        sim.place_apple(Cell::new(5, 0), false);
        assert_eq!(choose_direction(&sim), Some(Direction::Right));
    }

    #[test]
    fn test_never_reverses() {
        let mut sim = sim();
        sim.place_apple(Cell::new(-7, 0), false);
        let dir = choose_direction(&sim).unwrap();
        assert_ne!(dir, Direction::Left);
    }

    #[test]
    fn test_avoids_obstacles() {
        let mut sim = sim();
        sim.place_apple(Cell::new(5, 0), false);
        sim.obstacles_mut().register(Cell::new(1, 0));
        let dir = choose_direction(&sim).unwrap();
        assert!(dir == Direction::Up || dir == Direction::Down);
    }

    #[test]
    fn test_tail_is_safe_while_growth_is_far_off() {
        let mut sim = sim();
        sim.place_apple(Cell::new(-9, 5), false);
        for dir in [Direction::Up, Direction::Left] {
            sim.set_direction(dir);
            step(&mut sim);
        }
        let tail = Cell::new(-1, 0);
        assert_eq!(*sim.body().last().unwrap(), tail);

        sim.pulses = vec![0];
        assert!(is_safe(&sim, tail));
        sim.pulses = vec![1];
        assert!(!is_safe(&sim, tail));
    }

    #[test]
    fn test_autopilot_eats_apples() {
        let mut sim = sim();
        sim.place_apple(Cell::new(3, 2), false);
        for _ in 0..12 {
            if let Some(dir) = choose_direction(&sim) {
                sim.set_direction(dir);
            }
            step(&mut sim);
        }
        assert!(!sim.is_dead());
        assert!(sim.score() >= 1);
    }
}
