//! Per-kind re-trigger throttling, independent of dwell confirmation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use vitrine_core::{CooldownSettings, Timestamp};

use crate::gesture::GestureKind;

/// What a cooldown entry throttles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooldownKey {
    Pose(GestureKind),
    Swipe,
}

/// Last-fire timestamps per key.
///
/// Entries are created on first fire and overwritten on every later fire;
/// they are never removed. A key may fire only once `now - last >= cooldown`.
#[derive(Debug, Clone)]
pub struct CooldownRegistry {
    settings: CooldownSettings,
    last_fired: HashMap<CooldownKey, Timestamp>,
}

impl CooldownRegistry {
    pub fn new(settings: CooldownSettings) -> Self {
        Self {
            settings,
            last_fired: HashMap::new(),
        }
    }

    pub fn cooldown_ms(&self, key: CooldownKey) -> u64 {
        match key {
            CooldownKey::Pose(_) => self.settings.pose_ms,
            CooldownKey::Swipe => self.settings.swipe_ms,
        }
    }

    pub fn is_ready(&self, key: CooldownKey, now: Timestamp) -> bool {
        self.remaining_ms(key, now) <= 0.0
    }

    /// Milliseconds until `key` may fire again (zero or negative when ready)
    pub fn remaining_ms(&self, key: CooldownKey, now: Timestamp) -> f64 {
        match self.last_fired.get(&key) {
            Some(last) => self.cooldown_ms(key) as f64 - now.millis_since(*last),
            None => 0.0,
        }
    }

    /// Record a fire if the key is ready. Returns whether it fired.
    pub fn try_fire(&mut self, key: CooldownKey, now: Timestamp) -> bool {
        if !self.is_ready(key, now) {
            trace!(
                "{:?} cooling down, {:.0}ms left",
                key,
                self.remaining_ms(key, now)
            );
            return false;
        }
        self.record(key, now);
        true
    }

    pub fn record(&mut self, key: CooldownKey, now: Timestamp) {
        self.last_fired.insert(key, now);
    }

    pub fn last_fired(&self, key: CooldownKey) -> Option<Timestamp> {
        self.last_fired.get(&key).copied()
    }
}

impl Default for CooldownRegistry {
    fn default() -> Self {
        Self::new(CooldownSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fire_always_allowed() {
        let mut registry = CooldownRegistry::default();
        assert!(registry.is_ready(CooldownKey::Swipe, Timestamp::from_millis(0)));
        assert!(registry.try_fire(CooldownKey::Swipe, Timestamp::from_millis(0)));
        assert_eq!(
            registry.last_fired(CooldownKey::Swipe),
            Some(Timestamp::from_millis(0))
        );
    }

    #[test]
    fn test_swipe_cooldown_gates_refire() {
        let mut registry = CooldownRegistry::default();
        assert!(registry.try_fire(CooldownKey::Swipe, Timestamp::from_millis(1000)));
        assert!(!registry.try_fire(CooldownKey::Swipe, Timestamp::from_millis(1599)));
        // Denied attempts do not move the entry
        assert_eq!(
            registry.last_fired(CooldownKey::Swipe),
            Some(Timestamp::from_millis(1000))
        );
        assert!(registry.try_fire(CooldownKey::Swipe, Timestamp::from_millis(1600)));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut registry = CooldownRegistry::new(CooldownSettings {
            swipe_ms: 600,
            pose_ms: 500,
        });
        let thumb = CooldownKey::Pose(GestureKind::ThumbUp);
        let palm = CooldownKey::Pose(GestureKind::OpenPalm);

        assert!(registry.try_fire(thumb, Timestamp::from_millis(0)));
        assert!(registry.try_fire(palm, Timestamp::from_millis(10)));
        assert!(registry.try_fire(CooldownKey::Swipe, Timestamp::from_millis(20)));
        assert!(!registry.try_fire(thumb, Timestamp::from_millis(100)));
        assert!((registry.remaining_ms(thumb, Timestamp::from_millis(100)) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_pose_cooldown() {
        let mut registry = CooldownRegistry::default();
        let key = CooldownKey::Pose(GestureKind::Victory);
        assert!(registry.try_fire(key, Timestamp::from_millis(0)));
        assert!(registry.try_fire(key, Timestamp::from_millis(0)));
    }
}
