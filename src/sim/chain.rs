//! Apple chain combo and fever tracking

use serde::{Deserialize, Serialize};

use crate::settings::ChainConfig;

/// Consecutive-apple combo.
///
/// Level 1 is idle; each apple eaten within the current window raises the
/// level by one up to `max_level`. The window is recomputed whenever a new
/// apple appears, growing with the distance the snake has to travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTimer {
    level: u32,
    /// World time of the last apple eaten
    last_apple: Option<f32>,
    window: f32,
    max_level: u32,
    window_base: f32,
    window_per_cell: f32,
    window_cap: f32,
}

impl ChainTimer {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            level: 1,
            last_apple: None,
            window: config.window_base,
            max_level: config.max_level,
            window_base: config.window_base,
            window_per_cell: config.window_per_cell,
            window_cap: config.window_cap,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn window(&self) -> f32 {
        self.window
    }

    pub fn is_chaining(&self) -> bool {
        self.level > 1
    }

    /// Register an apple eaten at `now`. Returns the new level.
    pub fn on_apple_eaten(&mut self, now: f32) -> u32 {
        let in_window = self
            .last_apple
            .is_some_and(|last| now - last <= self.window);
        self.level = if in_window {
            (self.level + 1).min(self.max_level)
        } else {
            1
        };
        self.last_apple = Some(now);
        self.level
    }

    /// Window for the next apple, `distance` cells away from the head
    pub fn recompute_window(&mut self, distance: Option<i32>) {
        self.window = match distance {
            Some(d) => (self.window_base + self.window_per_cell * d as f32)
                .clamp(self.window_base, self.window_cap),
            None => self.window_base,
        };
    }

    /// Drop back to level 1 once the window has run out.
    /// Returns true when a chain was broken.
    pub fn tick(&mut self, now: f32) -> bool {
        match self.last_apple {
            Some(last) if self.level > 1 && now - last > self.window => {
                self.level = 1;
                true
            }
            _ => false,
        }
    }

    /// Seconds left to extend the chain
    pub fn time_left(&self, now: f32) -> f32 {
        match self.last_apple {
            Some(last) => (self.window - (now - last)).max(0.0),
            None => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.level = 1;
        self.last_apple = None;
        self.window = self.window_base;
    }
}

/// Fever state change reported by [`FeverMeter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeverChange {
    Started,
    Ended,
}

/// Streak of apples eaten at the top chain level.
///
/// Enough of them in a row light up fever for a fixed stretch of world time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeverMeter {
    streak: u32,
    until: Option<f32>,
    need: u32,
    min_chain: u32,
    duration: f32,
}

impl FeverMeter {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            streak: 0,
            until: None,
            need: config.fever_streak.max(1),
            min_chain: config.max_level,
            duration: config.fever_duration,
        }
    }

    pub fn is_active(&self) -> bool {
        self.until.is_some()
    }

    pub fn on_apple(&mut self, chain_level: u32, now: f32) -> Option<FeverChange> {
        if self.is_active() {
            return None;
        }
        if chain_level < self.min_chain {
            self.streak = 0;
            return None;
        }
        self.streak += 1;
        if self.streak >= self.need {
            self.streak = 0;
            self.until = Some(now + self.duration);
            return Some(FeverChange::Started);
        }
        None
    }

    pub fn tick(&mut self, now: f32) -> Option<FeverChange> {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                Some(FeverChange::Ended)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.streak = 0;
        self.until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> ChainTimer {
        ChainTimer::new(&ChainConfig::default())
    }

    #[test]
    fn test_first_apple_stays_idle() {
        let mut chain = timer();
        assert_eq!(chain.on_apple_eaten(3.0), 1);
        assert!(!chain.is_chaining());
    }

    #[test]
    fn test_apple_inside_window_extends_chain() {
        let mut chain = timer();
        chain.on_apple_eaten(1.0);
        assert_eq!(chain.on_apple_eaten(2.0), 2);
        assert_eq!(chain.on_apple_eaten(3.6), 3);
    }

    #[test]
    fn test_apple_outside_window_resets() {
        let mut chain = timer();
        chain.on_apple_eaten(1.0);
        chain.on_apple_eaten(2.0);
        assert_eq!(chain.on_apple_eaten(3.71), 1);
    }

    #[test]
    fn test_level_capped_at_max() {
        let mut chain = timer();
        for i in 0..10 {
            chain.on_apple_eaten(i as f32 * 0.5);
        }
        assert_eq!(chain.level(), ChainConfig::default().max_level);
    }

    #[test]
    fn test_window_scales_with_distance() {
        let mut chain = timer();
        chain.recompute_window(Some(20));
        // 1.7 + 0.035 * 20 = 2.4, under the 2.6 cap
        assert!((chain.window() - 2.4).abs() < 1e-5);
        chain.recompute_window(Some(100));
        assert!((chain.window() - 2.6).abs() < 1e-5);
        chain.recompute_window(Some(0));
        assert!((chain.window() - 1.7).abs() < 1e-5);
        chain.recompute_window(None);
        assert!((chain.window() - 1.7).abs() < 1e-5);
    }

    #[test]
    fn test_tick_breaks_expired_chain() {
        let mut chain = timer();
        chain.on_apple_eaten(0.0);
        chain.on_apple_eaten(1.0);
        assert!(!chain.tick(2.6));
        assert!(chain.tick(2.8));
        assert_eq!(chain.level(), 1);
        // Already idle: nothing to break
        assert!(!chain.tick(10.0));
    }

    #[test]
    fn test_time_left() {
        let mut chain = timer();
        assert_eq!(chain.time_left(5.0), 0.0);
        chain.on_apple_eaten(5.0);
        assert!((chain.time_left(5.5) - 1.2).abs() < 1e-5);
        assert_eq!(chain.time_left(9.0), 0.0);
    }

    #[test]
    fn test_fever_needs_unbroken_streak() {
        let config = ChainConfig::default();
        let mut fever = FeverMeter::new(&config);
        let top = config.max_level;
        assert_eq!(fever.on_apple(top, 0.0), None);
        assert_eq!(fever.on_apple(top, 1.0), None);
        assert_eq!(fever.on_apple(2, 2.0), None);
        assert_eq!(fever.on_apple(top, 3.0), None);
        assert_eq!(fever.on_apple(top, 4.0), None);
        assert_eq!(fever.on_apple(top, 5.0), Some(FeverChange::Started));
        assert!(fever.is_active());
        assert_eq!(fever.tick(12.9), None);
        assert_eq!(fever.tick(13.0), Some(FeverChange::Ended));
        assert!(!fever.is_active());
    }
}
