//! Transient signals for the presentation layer.
//!
//! Nothing here renders; UI components subscribe to the [`FeedbackBus`] and
//! draw progress rings, toasts and so on from what arrives.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use vitrine_gesture::{GestureKind, SwipeDirection};

pub const FEEDBACK_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A short user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
}

impl Feedback {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}

/// Per-gesture visual state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureSignal {
    /// Hold progress in [0, 1]
    Progress { kind: GestureKind, progress: f64 },
    Success { kind: GestureKind },
    Failure { kind: GestureKind },
    Swipe { direction: SwipeDirection },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UiSignal {
    Gesture(GestureSignal),
    Message(Feedback),
}

/// Broadcast fan-out to UI subscribers. Cloning shares the channel.
#[derive(Clone)]
pub struct FeedbackBus {
    tx: broadcast::Sender<UiSignal>,
}

impl FeedbackBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEEDBACK_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiSignal> {
        self.tx.subscribe()
    }

    pub fn gesture(&self, signal: GestureSignal) {
        let _ = self.tx.send(UiSignal::Gesture(signal));
    }

    pub fn message(&self, feedback: Feedback) {
        let _ = self.tx.send(UiSignal::Message(feedback));
    }
}

impl Default for FeedbackBus {
    fn default() -> Self {
        Self::new()
    }
}
