//! # Vitrine-Control
//!
//! Routes confirmed gestures and voice commands into application actions.
//!
//! ## Flow
//!
//! ```text
//! HandFrame ─▶ classify ─▶ stabilize ─┐
//!          └─▶ swipe (pointing only) ─┤
//!                                     ▼
//!                      ActionLock (gesture) ◀── VoiceGateway (voice)
//!                                     │
//!                                     ▼
//!                   Dispatcher: (Action, AppMode) ─▶ Store mutation
//!                                     │
//!                                     ▼
//!                        FeedbackBus ─▶ UI subscribers
//! ```
//!
//! Voice and gesture callbacks are unsynchronized, so both go through the
//! same [`ActionLock`] with a scoped guard before touching the store. A denied
//! acquisition drops the action; the shopper repeats the gesture or phrase.

pub mod action;
pub mod dispatcher;
pub mod feedback;
pub mod lock;
pub mod pipeline;
pub mod voice;

pub use action::*;
pub use dispatcher::*;
pub use feedback::*;
pub use lock::*;
pub use pipeline::*;
pub use voice::*;
