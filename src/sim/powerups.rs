//! Powerup pickups on the board and the player's stash

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::PowerupKind;
use super::grid::{Board, Cell};
use crate::error::{SimError, SimResult};
use crate::settings::{PowerupConfig, PowerupDef};

/// A pickup entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerupKind,
    pub cell: Cell,
}

/// Places pickups on a randomized timer and hands them out on contact.
///
/// The timer only runs while there is room for another pickup; Freeze
/// stretches it through [`set_interval_scale`](Self::set_interval_scale).
#[derive(Debug, Clone)]
pub struct PowerupSpawner {
    /// Active pickups (sorted by id for determinism)
    pickups: Vec<Pickup>,
    table: Vec<PowerupDef>,
    auto_spawn: bool,
    interval_min: f32,
    interval_max: f32,
    interval_scale: f32,
    attempts: u32,
    max_active: usize,
    /// Seconds until the next spawn attempt
    timer: f32,
    next_id: u32,
}

impl PowerupSpawner {
    pub fn new(config: &PowerupConfig) -> Self {
        Self {
            pickups: Vec::new(),
            table: config.table.clone(),
            auto_spawn: config.auto_spawn,
            interval_min: config.spawn_interval_min,
            interval_max: config.spawn_interval_max,
            interval_scale: 1.0,
            attempts: config.spawn_attempts,
            max_active: config.max_active,
            timer: config.spawn_interval_min,
            next_id: 1,
        }
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn is_at(&self, cell: Cell) -> bool {
        self.pickups.iter().any(|p| p.cell == cell)
    }

    fn is_full(&self) -> bool {
        self.max_active > 0 && self.pickups.len() >= self.max_active
    }

    fn has_weights(&self) -> bool {
        self.table.iter().any(|d| d.weight > 0)
    }

    /// Scale future spawn intervals (Freeze doubles them)
    pub fn set_interval_scale(&mut self, scale: f32) {
        self.interval_scale = scale.max(0.1);
    }

    pub fn interval_scale(&self) -> f32 {
        self.interval_scale
    }

    /// Restart the countdown with a fresh random interval
    pub fn reset_timer(&mut self, rng: &mut impl Rng) {
        let min = self.interval_min;
        let max = self.interval_max.max(min);
        let base = if max > min { rng.random_range(min..max) } else { min };
        self.timer = base * self.interval_scale;
    }

    /// Run the countdown by `dt`. Returns true when a spawn attempt is due;
    /// the timer is already reset by then.
    pub fn tick(&mut self, rng: &mut impl Rng, dt: f32) -> bool {
        if !self.auto_spawn || !self.has_weights() || self.is_full() {
            return false;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        self.reset_timer(rng);
        true
    }

    /// Weighted pick from the table
    pub fn pick_kind(&self, rng: &mut impl Rng) -> Option<PowerupKind> {
        let total: u32 = self.table.iter().map(|d| d.weight).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for def in &self.table {
            if roll < def.weight {
                return Some(def.kind);
            }
            roll -= def.weight;
        }
        None
    }

    /// Spawn a random kind on a random free play-area cell.
    ///
    /// Only `attempts` random draws are made; a crowded board simply skips
    /// this round.
    pub fn spawn_random(
        &mut self,
        rng: &mut impl Rng,
        board: &Board,
        is_free: impl Fn(Cell) -> bool,
    ) -> SimResult<Pickup> {
        let kind = self.pick_kind(rng).ok_or(SimError::NoFreeCell)?;
        for _ in 0..self.attempts {
            let cell = Cell::new(
                rng.random_range(-board.border_x..=board.border_x),
                rng.random_range(board.play_bottom()..=board.play_top()),
            );
            if is_free(cell) && !self.is_at(cell) {
                return self.spawn(cell, kind).ok_or(SimError::NoFreeCell);
            }
        }
        Err(SimError::NoFreeCell)
    }

    /// Place a pickup at `cell`. Fails when full or the cell already holds one.
    pub fn spawn(&mut self, cell: Cell, kind: PowerupKind) -> Option<Pickup> {
        if self.is_full() || self.is_at(cell) {
            return None;
        }
        let pickup = Pickup {
            id: self.next_id,
            kind,
            cell,
        };
        self.next_id += 1;
        self.pickups.push(pickup);
        Some(pickup)
    }

    /// Remove and return the pickup lying on `cell`
    pub fn try_consume_at(&mut self, cell: Cell) -> Option<PowerupKind> {
        let idx = self.pickups.iter().position(|p| p.cell == cell)?;
        Some(self.pickups.remove(idx).kind)
    }

    /// Move a pickup (magnet pull)
    pub fn nudge(&mut self, id: u32, to: Cell) {
        if let Some(p) = self.pickups.iter_mut().find(|p| p.id == id) {
            p.cell = to;
        }
    }

    pub fn clear(&mut self) {
        self.pickups.clear();
    }
}

/// A stash slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashSlot {
    pub kind: PowerupKind,
    pub count: u32,
}

/// Powerups collected but not yet used, in pickup order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerupStash {
    slots: Vec<StashSlot>,
    max_slots: usize,
    stack_limit: u32,
}

impl PowerupStash {
    pub fn new(max_slots: usize, stack_limit: u32) -> Self {
        Self {
            slots: Vec::with_capacity(max_slots),
            max_slots,
            stack_limit,
        }
    }

    pub fn from_config(config: &PowerupConfig) -> Self {
        Self::new(config.stash_slots, config.stash_stack_limit)
    }

    /// Store one powerup. Returns false when its slot is at the stack limit
    /// or no slot is free.
    pub fn add(&mut self, kind: PowerupKind) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.kind == kind) {
            if self.stack_limit > 0 && slot.count >= self.stack_limit {
                return false;
            }
            slot.count += 1;
            return true;
        }
        if self.slots.len() >= self.max_slots {
            return false;
        }
        self.slots.push(StashSlot { kind, count: 1 });
        true
    }

    /// Take one powerup out. An emptied slot is freed.
    pub fn take(&mut self, kind: PowerupKind) -> bool {
        let Some(idx) = self.slots.iter().position(|s| s.kind == kind) else {
            return false;
        };
        self.slots[idx].count -= 1;
        if self.slots[idx].count == 0 {
            self.slots.remove(idx);
        }
        true
    }

    pub fn count(&self, kind: PowerupKind) -> u32 {
        self.slots
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn slots(&self) -> &[StashSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
