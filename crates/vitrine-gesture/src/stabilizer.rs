//! Dwell confirmation for static poses.
//!
//! A candidate becomes a confirmed gesture only after it has been observed
//! uninterrupted for the hold duration. States:
//!
//! ```text
//! idle ──kind──▶ holding(k, t0) ──elapsed ≥ hold──▶ confirmed(k)
//!  ▲                 │  │                               │
//!  │   none / no hand│  │ k' ≠ k: restart timing        │ re-arm: t0 = now + offset
//!  └─────────────────┘  └──▶ holding(k', now)           └──▶ holding(k, t0)
//! ```
//!
//! After firing, the timer is pushed into the future instead of returning to
//! idle, so a pose that is simply kept up cannot fire again on the next frame.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vitrine_core::{StabilizerSettings, Timestamp};

use crate::gesture::{GestureCandidate, GestureKind};

/// Live dwell state. Invariant: `pending_kind == None` implies `last_progress == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilizerState {
    pub pending_kind: Option<GestureKind>,
    pub pending_start: Timestamp,
    pub last_progress: f64,
    pub just_succeeded: bool,
}

impl StabilizerState {
    pub fn idle() -> Self {
        Self {
            pending_kind: None,
            pending_start: Timestamp::from_nanos(0),
            last_progress: 0.0,
            just_succeeded: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending_kind.is_none()
    }
}

impl Default for StabilizerState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Signals emitted while advancing the stabilizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StabilizerEvent {
    /// Hold progress in [0, 1) for the pending pose
    Progress { kind: GestureKind, progress: f64 },
    /// A hold past the reporting threshold was abandoned
    Failed { kind: GestureKind, progress: f64 },
    /// The pose was held long enough; fire its action once
    Confirmed { kind: GestureKind },
}

/// Per-frame dwell state machine
#[derive(Debug, Clone)]
pub struct DwellStabilizer {
    settings: StabilizerSettings,
    state: StabilizerState,
}

impl DwellStabilizer {
    pub fn new(settings: StabilizerSettings) -> Self {
        Self {
            settings,
            state: StabilizerState::idle(),
        }
    }

    /// Advance by one frame with this frame's candidate
    pub fn advance(&mut self, candidate: &GestureCandidate, now: Timestamp) -> Vec<StabilizerEvent> {
        let mut events = Vec::new();

        let Some(kind) = candidate.kind else {
            self.interrupt(&mut events);
            return events;
        };

        if self.state.pending_kind != Some(kind) {
            self.interrupt(&mut events);
            self.state = StabilizerState {
                pending_kind: Some(kind),
                pending_start: now,
                last_progress: 0.0,
                just_succeeded: false,
            };
            events.push(StabilizerEvent::Progress {
                kind,
                progress: 0.0,
            });
            return events;
        }

        let hold_ms = self.settings.hold_duration_ms as f64;
        let elapsed = now.millis_since(self.state.pending_start);

        if elapsed >= hold_ms {
            debug!("Gesture {} held for {:.0}ms, confirming", kind, elapsed);
            events.push(StabilizerEvent::Confirmed { kind });
            self.state.pending_start = now.plus_millis(self.settings.rearm_offset_ms);
            self.state.last_progress = 0.0;
            self.state.just_succeeded = true;
            return events;
        }

        // Negative while the re-arm offset is still running
        let progress = (elapsed / hold_ms).clamp(0.0, 1.0);
        if elapsed > 0.0 {
            self.state.just_succeeded = false;
        }
        self.state.last_progress = progress;
        events.push(StabilizerEvent::Progress { kind, progress });
        events
    }

    /// Drop any pending hold, reporting a failure if it was far enough along
    fn interrupt(&mut self, events: &mut Vec<StabilizerEvent>) {
        if let Some(kind) = self.state.pending_kind {
            let progress = self.state.last_progress;
            if !self.state.just_succeeded && progress > self.settings.failure_progress {
                debug!("Gesture {} interrupted at {:.0}%", kind, progress * 100.0);
                events.push(StabilizerEvent::Failed { kind, progress });
            }
        }
        self.state = StabilizerState::idle();
    }

    /// Return to idle without emitting anything
    pub fn reset(&mut self) {
        self.state = StabilizerState::idle();
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    pub fn settings(&self) -> &StabilizerSettings {
        &self.settings
    }
}

impl Default for DwellStabilizer {
    fn default() -> Self {
        Self::new(StabilizerSettings::default())
    }
}
