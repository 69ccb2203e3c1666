//! Horizontal swipe detection from wrist motion.
//!
//! Swipes are motion, not poses, so they bypass dwell confirmation. The
//! detector keeps an anchor (wrist position and time) and fires when the
//! horizontal travel from the anchor crosses a threshold.
//!
//! ## Direction hysteresis
//!
//! A hand that just swiped one way tends to drift back as it settles. To keep
//! that drift from reading as a second swipe, reversing the last direction
//! requires `reverse_multiplier` times the base travel. A run of still frames
//! means the hand has settled, and clears the remembered direction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vitrine_core::{SwipeSettings, Timestamp};

use crate::gesture::SwipeDirection;

/// Anchor and hysteresis state, independent of the dwell stabilizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeTrackerState {
    pub anchor_x: Option<f64>,
    pub anchor_y: Option<f64>,
    pub anchor_time: Timestamp,
    pub last_direction: Option<SwipeDirection>,
    pub stable_frame_count: u32,
}

impl Default for SwipeTrackerState {
    fn default() -> Self {
        Self {
            anchor_x: None,
            anchor_y: None,
            anchor_time: Timestamp::from_nanos(0),
            last_direction: None,
            stable_frame_count: 0,
        }
    }
}

/// A confirmed swipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeDetection {
    pub direction: SwipeDirection,
    /// Horizontal travel from the anchor
    pub delta_x: f64,
    /// Threshold that was crossed (base or reversal)
    pub threshold: f64,
}

#[derive(Debug, Clone)]
pub struct SwipeDetector {
    settings: SwipeSettings,
    state: SwipeTrackerState,
    previous_x: Option<f64>,
}

impl SwipeDetector {
    pub fn new(settings: SwipeSettings) -> Self {
        Self {
            settings,
            state: SwipeTrackerState::default(),
            previous_x: None,
        }
    }

    /// Feed this frame's wrist position. Returns a detection when a swipe fires.
    pub fn update(&mut self, x: f64, y: f64, now: Timestamp) -> Option<SwipeDetection> {
        self.track_stillness(x, y, now);

        let (Some(anchor_x), Some(anchor_y)) = (self.state.anchor_x, self.state.anchor_y) else {
            self.set_anchor(x, y, now);
            return None;
        };

        if now.millis_since(self.state.anchor_time) > self.settings.anchor_timeout_ms as f64 {
            // Stale: the motion took too long to be a swipe
            self.set_anchor(x, y, now);
            return None;
        }

        let delta_x = x - anchor_x;
        let delta_y = y - anchor_y;

        // Mirrored display: wrist moving toward +x shows as moving left
        let direction = if delta_x > 0.0 {
            SwipeDirection::Left
        } else if delta_x < 0.0 {
            SwipeDirection::Right
        } else {
            return None;
        };

        let threshold = self.threshold_for(direction);
        if delta_x.abs() < threshold {
            return None;
        }

        if delta_y.abs() > self.settings.vertical_ratio * delta_x.abs() {
            debug!("Rejecting vertical motion (dx={:.3}, dy={:.3})", delta_x, delta_y);
            self.set_anchor(x, y, now);
            return None;
        }

        self.set_anchor(x, y, now);
        self.state.last_direction = Some(direction);
        self.state.stable_frame_count = 0;

        Some(SwipeDetection {
            direction,
            delta_x,
            threshold,
        })
    }

    /// Track the hand without allowing a swipe (e.g. during cooldown).
    ///
    /// The anchor follows the hand, so travel is measured from where the hand
    /// is when swiping becomes possible again.
    pub fn follow(&mut self, x: f64, y: f64, now: Timestamp) {
        self.track_stillness(x, y, now);
        self.set_anchor(x, y, now);
    }

    /// Travel required to fire in `direction` given the last confirmed swipe
    pub fn threshold_for(&self, direction: SwipeDirection) -> f64 {
        match self.state.last_direction {
            Some(last) if last == direction.opposite() => self.settings.reverse_threshold(),
            _ => self.settings.base_threshold,
        }
    }

    fn track_stillness(&mut self, x: f64, y: f64, now: Timestamp) {
        if let Some(previous) = self.previous_x {
            if (x - previous).abs() < self.settings.stillness_velocity {
                self.state.stable_frame_count = self.state.stable_frame_count.saturating_add(1);
                if self.state.stable_frame_count >= self.settings.stillness_frames
                    && self.state.last_direction.is_some()
                {
                    debug!("Hand settled, clearing swipe direction");
                    self.state.last_direction = None;
                    self.set_anchor(x, y, now);
                }
            } else {
                self.state.stable_frame_count = 0;
            }
        }
        self.previous_x = Some(x);
    }

    fn set_anchor(&mut self, x: f64, y: f64, now: Timestamp) {
        self.state.anchor_x = Some(x);
        self.state.anchor_y = Some(y);
        self.state.anchor_time = now;
    }

    /// Forget the anchor (hand lost or left the pointing pose). Hysteresis is kept.
    pub fn release_anchor(&mut self) {
        self.state.anchor_x = None;
        self.state.anchor_y = None;
        self.state.stable_frame_count = 0;
        self.previous_x = None;
    }

    /// Forget everything, including the remembered direction
    pub fn reset(&mut self) {
        self.state = SwipeTrackerState::default();
        self.previous_x = None;
    }

    pub fn state(&self) -> &SwipeTrackerState {
        &self.state
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(SwipeSettings::default())
    }
}
