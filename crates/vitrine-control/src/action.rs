//! The modality-independent action vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

use vitrine_gesture::{GestureKind, SwipeDirection};

/// Step through the coverflow or the cart list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavDirection {
    Previous,
    Next,
}

impl NavDirection {
    /// Mirrored view: a "left" swipe advances
    pub fn from_swipe(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => NavDirection::Next,
            SwipeDirection::Right => NavDirection::Previous,
        }
    }

    /// Neighbouring index, `None` past either end
    pub fn step(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            NavDirection::Previous => index.checked_sub(1).filter(|i| *i < len),
            NavDirection::Next => index.checked_add(1).filter(|i| *i < len),
        }
    }
}

/// What the shopper asked for, regardless of how they asked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// +1
    Confirm,
    /// -1
    Remove,
    Back,
    NextStep,
    /// +2
    DoubleAdd,
    OpenDetails,
    Navigate(NavDirection),
    /// Voice only
    ShowCart,
    /// Voice only; `None` clears the filter
    Filter(Option<String>),
}

impl Action {
    /// Pose mapping. Rest poses map to nothing.
    pub fn from_gesture(kind: GestureKind) -> Option<Self> {
        match kind {
            GestureKind::ThumbUp => Some(Action::Confirm),
            GestureKind::ThumbDown => Some(Action::Remove),
            GestureKind::OpenPalm => Some(Action::Back),
            GestureKind::Victory => Some(Action::NextStep),
            GestureKind::Pinch => Some(Action::DoubleAdd),
            GestureKind::Italian => Some(Action::OpenDetails),
            GestureKind::ClosedFist => None,
        }
    }

    pub fn from_swipe(direction: SwipeDirection) -> Self {
        Action::Navigate(NavDirection::from_swipe(direction))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Confirm => "confirm",
            Action::Remove => "remove",
            Action::Back => "back",
            Action::NextStep => "next-step",
            Action::DoubleAdd => "double-add",
            Action::OpenDetails => "open-details",
            Action::Navigate(NavDirection::Previous) => "previous",
            Action::Navigate(NavDirection::Next) => "next",
            Action::ShowCart => "show-cart",
            Action::Filter(_) => "filter",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Filter(Some(category)) => write!(f, "filter:{}", category),
            other => f.write_str(other.name()),
        }
    }
}
