//! Voice boundary.
//!
//! The speech layer matches phrases on its own and hands over discrete
//! command identifiers. They go through the same lock and dispatcher as
//! gestures.

use std::sync::Arc;

use tracing::debug;

use vitrine_core::{InputSource, Timestamp};
use vitrine_store::Store;

use crate::action::{Action, NavDirection};
use crate::dispatcher::{Dispatcher, Outcome};
use crate::feedback::FeedbackBus;
use crate::lock::ActionLock;

/// Resolve a command identifier such as `"add"` or `"filter:garden"`
pub fn parse_command(command: &str) -> Option<Action> {
    let command = command.trim().to_ascii_lowercase();
    if let Some(category) = command.strip_prefix("filter:") {
        let category = category.trim();
        return Some(Action::Filter(
            (!category.is_empty()).then(|| category.to_string()),
        ));
    }

    let action = match command.as_str() {
        "add" | "confirm" => Action::Confirm,
        "remove" => Action::Remove,
        "back" | "stop" => Action::Back,
        "next-step" | "checkout" | "pay" => Action::NextStep,
        "add-two" | "double-add" => Action::DoubleAdd,
        "details" | "open-details" => Action::OpenDetails,
        "next" => Action::Navigate(NavDirection::Next),
        "previous" => Action::Navigate(NavDirection::Previous),
        "cart" | "show-cart" => Action::ShowCart,
        "all" | "clear-filter" => Action::Filter(None),
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceResult {
    Dispatched(Outcome),
    /// Another input held the lock; the command was dropped
    Busy(Action),
    Unknown(String),
}

pub struct VoiceGateway {
    dispatcher: Dispatcher,
    lock: Arc<ActionLock>,
    feedback: FeedbackBus,
}

impl VoiceGateway {
    pub fn new(store: Arc<Store>, lock: Arc<ActionLock>, feedback: FeedbackBus) -> Self {
        Self {
            dispatcher: Dispatcher::new(store),
            lock,
            feedback,
        }
    }

    /// Parse and run one command at `now`
    pub fn handle_at(&self, command: &str, now: Timestamp) -> VoiceResult {
        match parse_command(command) {
            Some(action) => self.dispatch_at(action, now),
            None => {
                debug!("Unrecognised voice command '{}'", command);
                VoiceResult::Unknown(command.to_string())
            }
        }
    }

    pub fn handle(&self, command: &str) -> VoiceResult {
        self.handle_at(command, Timestamp::now())
    }

    pub fn dispatch_at(&self, action: Action, now: Timestamp) -> VoiceResult {
        let Some(_guard) = self.lock.guard_at(InputSource::Voice, now) else {
            debug!("Action lock busy, dropping voice '{}'", action);
            return VoiceResult::Busy(action);
        };
        let outcome = self.dispatcher.dispatch(&action);
        self.feedback.message(outcome.feedback.clone());
        VoiceResult::Dispatched(outcome)
    }

    /// For voice flows that hold the lock across several steps. Commands
    /// handled meanwhile run under that hold and leave it in place.
    pub fn acquire_action_lock(&self, now: Timestamp) -> bool {
        self.lock.acquire_at(InputSource::Voice, now)
    }

    pub fn release_action_lock(&self) -> bool {
        self.lock.release(InputSource::Voice)
    }
}
