//! Game state and core simulation types
//!
//! [`Simulation`] owns every piece of run state: the body and its occupancy,
//! growth pulses, apple, chain, effects, pickups, stash and obstacles. The
//! step function in `tick` mutates it; hosts read it through accessors and
//! drained events.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::apple::{Apple, AppleManager};
use super::chain::{ChainTimer, FeverMeter};
use super::clock::SimClock;
use super::effects::{ActiveEffects, PowerupKind};
use super::grid::{Board, Cell, Direction};
use super::obstacles::ObstacleRegistry;
use super::occupancy::Occupancy;
use super::powerups::{Pickup, PowerupSpawner, PowerupStash};
use crate::error::SimResult;
use crate::manhattan;
use crate::settings::GameConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Snake is moving
    Running,
    /// Run ended; only a reset brings it back
    Dead,
}

/// What killed the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Left a non-wrapping board
    Wall,
    Obstacle,
    /// Ran into its own body
    SelfCollision,
}

/// Events emitted by the simulation, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    AppleEaten {
        chain_level: u32,
        is_gold: bool,
        score_delta: u32,
        coins_delta: u32,
    },
    Died {
        cause: DeathCause,
        score: u64,
    },
    PowerupActivated {
        kind: PowerupKind,
        duration: f32,
    },
    PowerupExpired {
        kind: PowerupKind,
    },
    /// Shield absorbed an obstacle, which was removed
    ShieldConsumed {
        cell: Cell,
    },
    PowerupSpawned {
        kind: PowerupKind,
        cell: Cell,
    },
    /// Pickup went into the stash (or straight into effect when there is none)
    PowerupCollected {
        kind: PowerupKind,
    },
    /// Pickup was lost because its stash slot was full
    PowerupDiscarded {
        kind: PowerupKind,
    },
    ChainReset,
    FeverStarted,
    FeverEnded,
}

/// Complete run state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: GameConfig,
    /// Body cells, head first
    pub(crate) body: Vec<Cell>,
    /// Body before the most recent step, for interpolated rendering
    pub(crate) prev_body: Vec<Cell>,
    pub(crate) occupancy: Occupancy,
    pub(crate) dir: Direction,
    pub(crate) pending_dir: Direction,
    /// Growth pulses in flight, each the number of steps since its apple
    pub(crate) pulses: Vec<usize>,
    pub(crate) apples: AppleManager,
    pub(crate) chain: ChainTimer,
    pub(crate) fever: FeverMeter,
    pub(crate) effects: ActiveEffects,
    pub(crate) spawner: PowerupSpawner,
    pub(crate) stash: PowerupStash,
    pub(crate) obstacles: ObstacleRegistry,
    pub(crate) clock: SimClock,
    /// Real seconds banked toward the next step
    pub(crate) accumulator: f32,
    pub(crate) score: u64,
    pub(crate) coins: u64,
    pub(crate) phase: GamePhase,
    /// Steps taken this run
    pub(crate) steps: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl Simulation {
    /// Validate `config` and start a run
    pub fn new(config: GameConfig) -> SimResult<Self> {
        config.validate()?;
        let mut sim = Self {
            body: Vec::new(),
            prev_body: Vec::new(),
            occupancy: Occupancy::new(),
            dir: Direction::Right,
            pending_dir: Direction::Right,
            pulses: Vec::new(),
            apples: AppleManager::new(&config.apple),
            chain: ChainTimer::new(&config.chain),
            fever: FeverMeter::new(&config.chain),
            effects: ActiveEffects::new(),
            spawner: PowerupSpawner::new(&config.powerups),
            stash: PowerupStash::from_config(&config.powerups),
            obstacles: ObstacleRegistry::new(),
            clock: SimClock::default(),
            accumulator: 0.0,
            score: 0,
            coins: 0,
            phase: GamePhase::Running,
            steps: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            config,
        };
        sim.reset();
        Ok(sim)
    }

    /// Start a fresh run. The stash and obstacles carry over; undrained
    /// events are kept so a final `Died` is not lost.
    pub fn reset(&mut self) {
        let snake = &self.config.snake;
        self.body = (0..snake.start_length as i32)
            .map(|i| snake.start - Cell::new(i, 0))
            .collect();
        self.prev_body = self.body.clone();
        self.occupancy = Occupancy::from_cells(&self.body);
        self.dir = Direction::Right;
        self.pending_dir = Direction::Right;
        self.pulses.clear();
        self.chain.reset();
        self.fever.reset();
        self.effects.clear();
        self.clock = SimClock::default();
        self.spawner.clear();
        self.spawner.set_interval_scale(1.0);
        self.spawner.reset_timer(&mut self.rng);
        self.accumulator = 0.0;
        self.score = 0;
        self.coins = 0;
        self.steps = 0;
        self.phase = GamePhase::Running;
        self.apples.despawn();
        self.spawn_apple(false);
        log::info!(
            "Run reset ({}): length {}, head {:?}",
            self.config.mode.as_str(),
            self.body.len(),
            self.head()
        );
    }

    // Accessors

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.config.board
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn previous_body(&self) -> &[Cell] {
        &self.prev_body
    }

    /// Fraction of the current step interval already banked, for lerping
    /// between `previous_body` and `body`
    pub fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / self.step_interval()).clamp(0.0, 1.0)
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn pulses(&self) -> &[usize] {
        &self.pulses
    }

    pub fn apple(&self) -> Option<Apple> {
        self.apples.current()
    }

    pub fn pickups(&self) -> &[Pickup] {
        self.spawner.pickups()
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    /// Real seconds left on an effect
    pub fn effect_remaining(&self, kind: PowerupKind) -> f32 {
        self.effects.remaining(kind, self.clock.real)
    }

    pub fn stash(&self) -> &PowerupStash {
        &self.stash
    }

    pub fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleRegistry {
        &mut self.obstacles
    }

    pub fn chain_level(&self) -> u32 {
        self.chain.level()
    }

    pub fn chain_window(&self) -> f32 {
        self.chain.window()
    }

    /// World seconds left to extend the chain
    pub fn chain_time_left(&self) -> f32 {
        self.chain.time_left(self.clock.world)
    }

    pub fn is_fever(&self) -> bool {
        self.fever.is_active()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_dead(&self) -> bool {
        self.phase == GamePhase::Dead
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    /// Presentation time scale (0.5 while Freeze is up)
    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current step interval in real seconds
    pub fn step_interval(&self) -> f32 {
        let snake = &self.config.snake;
        let reduction = (self.chain.level() - 1) as f32 * snake.step_reduction_per_chain;
        let base = (snake.step_time_start - reduction).max(snake.step_time_min);
        if self.effects.is_active(PowerupKind::Freeze) {
            base * self.config.powerups.freeze_step_multiplier
        } else {
            base
        }
    }

    // Input

    /// Queue a turn for the next step. Reversing straight into the neck is
    /// ignored.
    pub fn set_direction(&mut self, dir: Direction) {
        if self.body.len() >= 2 && dir.is_reverse_of(self.dir) {
            return;
        }
        self.pending_dir = dir;
    }

    /// Activate one stashed powerup. Returns false when none is stashed or
    /// the run is over.
    pub fn use_powerup(&mut self, kind: PowerupKind) -> bool {
        if self.is_dead() || !self.stash.take(kind) {
            return false;
        }
        self.activate_powerup(kind);
        true
    }

    /// Start (or refresh) an effect with its configured duration
    pub fn activate_powerup(&mut self, kind: PowerupKind) {
        let duration = self.config.powerups.duration(kind);
        let applied = self.effects.activate(kind, duration, self.clock.real);
        if kind == PowerupKind::Freeze {
            self.set_frozen(true);
        }
        log::info!("Powerup {} active for {:.1}s", kind.as_str(), applied);
        self.events.push(GameEvent::PowerupActivated {
            kind,
            duration: applied,
        });
    }

    /// Put a pickup on the board directly. Returns false when the cell is
    /// taken or the board already holds the maximum.
    pub fn spawn_pickup(&mut self, cell: Cell, kind: PowerupKind) -> bool {
        if !self.config.board.in_bounds(cell) || !self.is_free(cell) {
            return false;
        }
        match self.spawner.spawn(cell, kind) {
            Some(p) => {
                self.events.push(GameEvent::PowerupSpawned {
                    kind: p.kind,
                    cell: p.cell,
                });
                true
            }
            None => false,
        }
    }

    // Internals shared with the step function

    pub(crate) fn set_frozen(&mut self, frozen: bool) {
        let powerups = &self.config.powerups;
        if frozen {
            self.clock.time_scale = powerups.freeze_time_scale;
            self.spawner
                .set_interval_scale(powerups.freeze_spawn_interval_scale);
        } else {
            self.clock.time_scale = 1.0;
            self.spawner.set_interval_scale(1.0);
        }
    }

    /// Where the magnet may drag an item: a free play-area cell
    pub(crate) fn is_pull_target(&self, c: Cell) -> bool {
        self.config.board.in_play_area(c) && self.is_free(c)
    }

    /// Not covered by the body, an obstacle, the apple or a pickup
    pub(crate) fn is_free(&self, c: Cell) -> bool {
        !self.occupancy.contains(c)
            && !self.obstacles.is_blocked(c)
            && self.apples.cell() != Some(c)
            && !self.spawner.is_at(c)
    }

    /// Whether the tail cell frees up this step: nothing is eaten and no
    /// growth pulse matures onto it
    pub(crate) fn tail_vacates(&self, eating: bool) -> bool {
        let len = self.body.len();
        !eating && !self.pulses.iter().any(|&p| p + 1 >= len - 1)
    }

    /// Place a new apple and size the chain window to its distance.
    /// A failed spawn leaves the running window untouched.
    pub(crate) fn spawn_apple(&mut self, is_gold: bool) -> Option<Cell> {
        let head = self.head();
        let obstacles = &self.obstacles;
        let spawner = &self.spawner;
        let result = self.apples.try_spawn(
            &mut self.rng,
            &self.config.board,
            &self.occupancy,
            |c| obstacles.is_blocked(c) || spawner.is_at(c),
            head,
            self.dir,
            is_gold,
        );
        match result {
            Ok(cell) => {
                self.chain.recompute_window(Some(manhattan(head, cell)));
                Some(cell)
            }
            Err(e) => {
                log::debug!("Apple spawn skipped: {}", e);
                None
            }
        }
    }

    /// Timed pickup spawn on a random free cell
    pub(crate) fn spawn_random_pickup(&mut self) {
        let occupancy = &self.occupancy;
        let obstacles = &self.obstacles;
        let apple = self.apples.cell();
        let result = self.spawner.spawn_random(&mut self.rng, &self.config.board, |c| {
            !occupancy.contains(c) && !obstacles.is_blocked(c) && apple != Some(c)
        });
        match result {
            Ok(p) => {
                log::debug!("Spawned {} pickup at {:?}", p.kind.as_str(), p.cell);
                self.events.push(GameEvent::PowerupSpawned {
                    kind: p.kind,
                    cell: p.cell,
                });
            }
            Err(e) => log::debug!("Pickup spawn skipped: {}", e),
        }
    }

    #[cfg(test)]
    pub(crate) fn place_apple(&mut self, cell: Cell, is_gold: bool) {
        self.apples.place(cell, is_gold);
        self.chain.recompute_window(Some(manhattan(self.head(), cell)));
    }

    #[cfg(test)]
    pub(crate) fn clear_apple(&mut self) {
        self.apples.despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Mode;

    #[test]
    fn test_new_lays_body_left_of_start() {
        let sim = Simulation::new(GameConfig::default()).unwrap();
        assert_eq!(
            sim.body(),
            &[Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0), Cell::new(-3, 0)]
        );
        assert_eq!(sim.direction(), Direction::Right);
        assert_eq!(sim.phase(), GamePhase::Running);
        assert_eq!(sim.occupancy().len(), 4);
        let apple = sim.apple().unwrap();
        assert!(!sim.occupancy().contains(apple.cell));
        assert!(!apple.is_gold);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.board.border_y = -2;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_step_interval_follows_chain_and_freeze() {
        let mut sim = Simulation::new(GameConfig::default()).unwrap();
        assert!((sim.step_interval() - 0.14).abs() < 1e-6);
        sim.activate_powerup(PowerupKind::Freeze);
        assert!((sim.step_interval() - 0.07).abs() < 1e-6);
        assert_eq!(sim.time_scale(), 0.5);

        let forest = Simulation::new(GameConfig::from_mode(Mode::Forest)).unwrap();
        assert!((forest.step_interval() - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_turn_is_ignored() {
        let mut sim = Simulation::new(GameConfig::default()).unwrap();
        sim.set_direction(Direction::Left);
        assert_eq!(sim.pending_dir, Direction::Right);
        sim.set_direction(Direction::Up);
        assert_eq!(sim.pending_dir, Direction::Up);
    }

    #[test]
    fn test_single_cell_snake_may_reverse() {
        let mut config = GameConfig::default();
        config.snake.start_length = 1;
        let mut sim = Simulation::new(config).unwrap();
        sim.set_direction(Direction::Left);
        assert_eq!(sim.pending_dir, Direction::Left);
    }

    #[test]
    fn test_use_powerup_needs_stash() {
        let mut sim = Simulation::new(GameConfig::default()).unwrap();
        assert!(!sim.use_powerup(PowerupKind::Ghost));
        sim.stash.add(PowerupKind::Ghost);
        assert!(sim.use_powerup(PowerupKind::Ghost));
        assert!(sim.effects().is_active(PowerupKind::Ghost));
        assert!(sim.stash().is_empty());
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::PowerupActivated {
                kind: PowerupKind::Ghost,
                duration: 8.0
            }]
        );
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_spawn_pickup_rejects_body_cells() {
        let mut sim = Simulation::new(GameConfig::default()).unwrap();
        sim.clear_apple();
        assert!(!sim.spawn_pickup(Cell::new(-1, 0), PowerupKind::Magnet));
        assert!(!sim.spawn_pickup(Cell::new(40, 0), PowerupKind::Magnet));
        assert!(sim.spawn_pickup(Cell::new(0, 3), PowerupKind::Magnet));
        assert_eq!(sim.pickups().len(), 1);
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let json = serde_json::to_string(&GameEvent::AppleEaten {
            chain_level: 2,
            is_gold: false,
            score_delta: 2,
            coins_delta: 2,
        })
        .unwrap();
        assert!(json.contains(r#""event":"apple_eaten""#));
        let json = serde_json::to_string(&GameEvent::ChainReset).unwrap();
        assert_eq!(json, r#"{"event":"chain_reset"}"#);
    }

    fn row_config() -> GameConfig {
        // One row of five cells, 1-long snake at the left edge
        let mut config = GameConfig::default();
        config.powerups.auto_spawn = false;
        config.board = Board::new(2, 0, true);
        config.snake.start_length = 1;
        config.snake.start = Cell::new(-2, 0);
        config
    }

    #[test]
    fn test_apple_never_shares_a_pickup_cell() {
        let mut sim = Simulation::new(row_config()).unwrap();
        sim.clear_apple();
        sim.obstacles_mut().register(Cell::new(2, 0));
        assert!(sim.spawn_pickup(Cell::new(1, 0), PowerupKind::Shield));
        // (-1,0) and (0,0) are the buffer ahead of the head; nothing is left
        assert_eq!(sim.spawn_apple(false), None);
        assert_eq!(sim.apple(), None);

        sim.obstacles_mut().clear();
        assert_eq!(sim.spawn_apple(false), Some(Cell::new(2, 0)));
    }

    #[test]
    fn test_failed_apple_spawn_keeps_chain_window() {
        let mut sim = Simulation::new(row_config()).unwrap();
        sim.clear_apple();
        sim.obstacles_mut().register(Cell::new(1, 0));
        sim.obstacles_mut().register(Cell::new(2, 0));
        sim.chain.recompute_window(Some(20));
        let window = sim.chain_window();
        assert!(window > sim.config().chain.window_base);
        assert_eq!(sim.spawn_apple(false), None);
        assert_eq!(sim.chain_window(), window);
    }

    #[test]
    fn test_tail_vacates_unless_growth_matures() {
        let mut sim = Simulation::new(GameConfig::default()).unwrap();
        assert!(sim.tail_vacates(false));
        assert!(!sim.tail_vacates(true));
        // Length 4: a pulse at 1 matures next step, one at 0 does not
        sim.pulses = vec![0];
        assert!(sim.tail_vacates(false));
        sim.pulses = vec![1];
        assert!(!sim.tail_vacates(false));
    }
}
