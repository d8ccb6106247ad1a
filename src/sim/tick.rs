//! Fixed timestep simulation tick
//!
//! `tick` banks host frame time and runs whole steps while the bank covers
//! the current step interval. `step` is one atomic move of the snake.

use super::autopilot;
use super::chain::FeverChange;
use super::effects::PowerupKind;
use super::grid::{Cell, Direction};
use super::state::{DeathCause, GameEvent, GamePhase, Simulation};
use crate::chebyshev;
use crate::consts::*;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired heading
    pub direction: Option<Direction>,
    /// Spend a stashed powerup
    pub use_powerup: Option<PowerupKind>,
    /// Idle/demo mode - the autopilot steers
    pub autopilot: bool,
}

/// Advance the simulation by one host frame of `dt` real seconds.
/// Returns the number of steps taken.
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) -> u32 {
    if sim.phase == GamePhase::Dead {
        return 0;
    }

    if let Some(kind) = input.use_powerup {
        sim.use_powerup(kind);
    }
    if let Some(dir) = input.direction {
        sim.set_direction(dir);
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    let world_dt = sim.clock.advance(dt);
    update_timers(sim, world_dt);

    sim.accumulator += dt;
    let mut steps = 0;
    while sim.phase == GamePhase::Running && steps < MAX_SUBSTEPS {
        let interval = sim.step_interval();
        if sim.accumulator < interval {
            break;
        }
        sim.accumulator -= interval;
        if input.autopilot {
            if let Some(dir) = autopilot::choose_direction(sim) {
                sim.set_direction(dir);
            }
        }
        step(sim);
        steps += 1;
    }

    // Drop any backlog the substep cap left behind
    if steps == MAX_SUBSTEPS {
        sim.accumulator = sim.accumulator.min(sim.step_interval());
    }
    steps
}

impl Simulation {
    /// Advance by a frame with no new input
    pub fn advance(&mut self, dt: f32) -> u32 {
        tick(self, &TickInput::default(), dt)
    }
}

/// Effect expiry, chain decay, fever and the pickup spawn timer
fn update_timers(sim: &mut Simulation, world_dt: f32) {
    for kind in sim.effects.tick(sim.clock.real) {
        if kind == PowerupKind::Freeze {
            sim.set_frozen(false);
        }
        log::debug!("Powerup {} expired", kind.as_str());
        sim.events.push(GameEvent::PowerupExpired { kind });
    }

    let now = sim.clock.world;
    if sim.chain.tick(now) {
        sim.events.push(GameEvent::ChainReset);
    }
    if let Some(FeverChange::Ended) = sim.fever.tick(now) {
        sim.events.push(GameEvent::FeverEnded);
    }

    if sim.spawner.tick(&mut sim.rng, world_dt) {
        sim.spawn_random_pickup();
    }
}

/// Run one discrete step of the snake
pub fn step(sim: &mut Simulation) {
    if sim.phase != GamePhase::Running {
        return;
    }
    sim.prev_body.clone_from(&sim.body);
    sim.steps += 1;

    // Resolve the queued turn; no 180s into the neck
    let len = sim.body.len();
    if len >= 2 && sim.pending_dir.is_reverse_of(sim.dir) {
        sim.pending_dir = sim.dir;
    } else {
        sim.dir = sim.pending_dir;
    }

    let head = sim.body[0];
    let Some(next) = sim.config.board.step(head, sim.dir) else {
        die(sim, DeathCause::Wall);
        return;
    };

    let ghost = sim.effects.is_active(PowerupKind::Ghost);
    if sim.obstacles.is_blocked(next) && !ghost {
        if sim.effects.consume_shield() {
            sim.obstacles.consume(next);
            log::info!("Shield absorbed obstacle at {:?}", next);
            sim.events.push(GameEvent::ShieldConsumed { cell: next });
        } else {
            die(sim, DeathCause::Obstacle);
            return;
        }
    }

    let ate = sim.apples.cell() == Some(next);

    let tail = sim.body[len - 1];
    if sim.occupancy.contains(next) && !ghost && !(next == tail && sim.tail_vacates(ate)) {
        die(sim, DeathCause::SelfCollision);
        return;
    }

    // Shift: drop the tail, push the new head
    sim.body.pop();
    sim.body.insert(0, next);
    sim.occupancy.remove(tail);
    sim.occupancy.add(next);

    if let Some(kind) = sim.spawner.try_consume_at(next) {
        collect_pickup(sim, kind);
    }

    let mut next_gold = false;
    if ate {
        next_gold = eat_apple(sim);
    }

    // Age pulses; a new pulse starts at zero on the step its apple is eaten
    for p in &mut sim.pulses {
        *p += 1;
    }
    if ate {
        sim.pulses.push(0);
    }
    let before = sim.pulses.len();
    sim.pulses.retain(|&p| p < len - 1);
    for _ in sim.pulses.len()..before {
        sim.body.push(tail);
        sim.occupancy.add(tail);
    }

    // Respawn after growth so the apple never lands on the new tail
    if sim.apples.current().is_none() {
        sim.spawn_apple(next_gold);
    }

    if sim.effects.is_active(PowerupKind::Magnet) {
        magnet_pull(sim);
    }
}

/// Score the apple under the head. Returns whether the next apple is gold.
fn eat_apple(sim: &mut Simulation) -> bool {
    let is_gold = sim.apples.current().is_some_and(|a| a.is_gold);
    sim.apples.despawn();

    let now = sim.clock.world;
    let level = sim.chain.on_apple_eaten(now);
    sim.score += u64::from(level);
    sim.coins += u64::from(level);
    sim.events.push(GameEvent::AppleEaten {
        chain_level: level,
        is_gold,
        score_delta: level,
        coins_delta: level,
    });

    if let Some(FeverChange::Started) = sim.fever.on_apple(level, now) {
        log::info!("Fever started at chain {}", level);
        sim.events.push(GameEvent::FeverStarted);
    }

    sim.apples.roll_gold(&mut sim.rng, level)
}

/// Stash a pickup, or apply it at once when stashing is off
fn collect_pickup(sim: &mut Simulation, kind: PowerupKind) {
    if !sim.config.powerups.stash_enabled {
        sim.events.push(GameEvent::PowerupCollected { kind });
        sim.activate_powerup(kind);
    } else if sim.stash.add(kind) {
        sim.events.push(GameEvent::PowerupCollected { kind });
    } else {
        log::debug!("Stash full, dropped {}", kind.as_str());
        sim.events.push(GameEvent::PowerupDiscarded { kind });
    }
}

/// One cell from `from` toward `to`, along the longer axis
fn toward(from: Cell, to: Cell) -> Cell {
    let d = to - from;
    if d.x.abs() >= d.y.abs() {
        from + Cell::new(d.x.signum(), 0)
    } else {
        from + Cell::new(0, d.y.signum())
    }
}

/// Drag nearby items one cell toward the head
fn magnet_pull(sim: &mut Simulation) {
    let head = sim.body[0];
    let radius = sim.config.powerups.magnet_radius;

    if let Some(apple) = sim.apples.cell() {
        if apple != head && chebyshev(apple, head) <= radius {
            let to = toward(apple, head);
            if sim.is_pull_target(to) {
                sim.apples.nudge(to);
            }
        }
    }

    let nearby: Vec<(u32, Cell)> = sim
        .spawner
        .pickups()
        .iter()
        .filter(|p| chebyshev(p.cell, head) <= radius)
        .map(|p| (p.id, p.cell))
        .collect();
    for (id, cell) in nearby {
        let to = toward(cell, head);
        if sim.is_pull_target(to) {
            sim.spawner.nudge(id, to);
        }
    }
}

fn die(sim: &mut Simulation, cause: DeathCause) {
    sim.phase = GamePhase::Dead;
    log::info!(
        "Snake died ({:?}) after {} steps, score {}",
        cause,
        sim.steps,
        sim.score
    );
    sim.events.push(GameEvent::Died {
        cause,
        score: sim.score,
    });
}
