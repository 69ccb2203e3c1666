//! # Vitrine-Gesture
//!
//! Turns the per-frame hand landmark stream into discrete, debounced gesture
//! events.
//!
//! ## Stages
//!
//! 1. **Classifier**: pure geometry over one frame → [`GestureCandidate`]
//! 2. **Stabilizer**: dwell confirmation; a pose must be held for the hold
//!    duration before it fires, exactly once
//! 3. **Swipe detector**: anchor/delta motion tracking with direction
//!    hysteresis, evaluated every frame independently of the stabilizer
//! 4. **Cooldown registry**: per-kind minimum interval between firings
//!
//! Nothing here reads a clock: every stage takes the frame [`Timestamp`], so
//! whole sequences replay deterministically in tests.
//!
//! [`Timestamp`]: vitrine_core::Timestamp

pub mod classifier;
pub mod cooldown;
pub mod gesture;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod poses;
pub mod stabilizer;
pub mod swipe;

pub use classifier::*;
pub use cooldown::*;
pub use gesture::*;
pub use stabilizer::*;
pub use swipe::*;
