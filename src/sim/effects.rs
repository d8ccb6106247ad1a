//! Timed powerup effects
//!
//! Effects count down in real (unscaled) seconds so Freeze does not slow its
//! own timer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::POWERUP_FALLBACK_DURATION;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Absorbs one obstacle contact
    Shield,
    /// Pulls nearby apples and pickups toward the head
    Magnet,
    /// Passes through the body and obstacles
    Ghost,
    /// Slows the world, quickens the snake's step
    Freeze,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::Shield,
        PowerupKind::Magnet,
        PowerupKind::Ghost,
        PowerupKind::Freeze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Shield => "shield",
            PowerupKind::Magnet => "magnet",
            PowerupKind::Ghost => "ghost",
            PowerupKind::Freeze => "freeze",
        }
    }
}

/// Active power-up effects, keyed by kind with their expiry time.
///
/// Ordered map so expiry notifications come out in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    expiry: BTreeMap<PowerupKind, f32>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or refresh an effect. Returns the duration actually applied.
    pub fn activate(&mut self, kind: PowerupKind, duration: f32, now: f32) -> f32 {
        let duration = if duration > 0.0 {
            duration
        } else {
            POWERUP_FALLBACK_DURATION
        };
        self.expiry.insert(kind, now + duration);
        duration
    }

    /// Drop every effect whose expiry has been reached, returning them
    pub fn tick(&mut self, now: f32) -> Vec<PowerupKind> {
        let expired: Vec<PowerupKind> = self
            .expiry
            .iter()
            .filter(|&(_, &until)| now >= until)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in &expired {
            self.expiry.remove(kind);
        }
        expired
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.expiry.contains_key(&kind)
    }

    /// Spend the shield on a hazard contact. Returns false when none was up.
    pub fn consume_shield(&mut self) -> bool {
        self.expiry.remove(&PowerupKind::Shield).is_some()
    }

    /// Seconds left on `kind`, zero when inactive
    pub fn remaining(&self, kind: PowerupKind, now: f32) -> f32 {
        self.expiry
            .get(&kind)
            .map(|&until| (until - now).max(0.0))
            .unwrap_or(0.0)
    }

    /// Active kinds with their expiry, in kind order
    pub fn iter(&self) -> impl Iterator<Item = (PowerupKind, f32)> + '_ {
        self.expiry.iter().map(|(&k, &t)| (k, t))
    }

    pub fn is_empty(&self) -> bool {
        self.expiry.is_empty()
    }

    pub fn clear(&mut self) {
        self.expiry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_and_expire() {
        let mut fx = ActiveEffects::new();
        fx.activate(PowerupKind::Ghost, 2.0, 10.0);
        assert!(fx.is_active(PowerupKind::Ghost));
        assert!(fx.tick(11.9).is_empty());
        assert_eq!(fx.tick(12.0), vec![PowerupKind::Ghost]);
        assert!(!fx.is_active(PowerupKind::Ghost));
    }

    #[test]
    fn test_reactivation_refreshes_expiry() {
        let mut fx = ActiveEffects::new();
        fx.activate(PowerupKind::Magnet, 5.0, 0.0);
        fx.activate(PowerupKind::Magnet, 5.0, 4.0);
        assert!(fx.tick(6.0).is_empty());
        assert!((fx.remaining(PowerupKind::Magnet, 6.0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_effects_are_independent() {
        let mut fx = ActiveEffects::new();
        fx.activate(PowerupKind::Freeze, 1.0, 0.0);
        fx.activate(PowerupKind::Shield, 3.0, 0.0);
        assert_eq!(fx.tick(1.5), vec![PowerupKind::Freeze]);
        assert!(fx.is_active(PowerupKind::Shield));
    }

    #[test]
    fn test_shield_consumed_early() {
        let mut fx = ActiveEffects::new();
        fx.activate(PowerupKind::Shield, 8.0, 0.0);
        assert!(fx.consume_shield());
        assert!(!fx.is_active(PowerupKind::Shield));
        assert!(!fx.consume_shield());
    }

    #[test]
    fn test_non_positive_duration_uses_fallback() {
        let mut fx = ActiveEffects::new();
        let applied = fx.activate(PowerupKind::Ghost, 0.0, 1.0);
        assert_eq!(applied, POWERUP_FALLBACK_DURATION);
        assert!((fx.remaining(PowerupKind::Ghost, 1.0) - POWERUP_FALLBACK_DURATION).abs() < 1e-5);
    }
}
