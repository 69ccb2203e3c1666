//! Gesture vocabulary shared by every recognition stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use vitrine_core::ModelGesture;

/// Static hand poses the kiosk recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    /// Thumb raised (model label)
    ThumbUp,
    /// Thumb lowered (model label)
    ThumbDown,
    /// Flat open hand (model label)
    OpenPalm,
    /// Index and middle finger "V" (model label)
    Victory,
    /// Closed fist (model label); a rest pose with no action of its own
    ClosedFist,
    /// All fingertips bunched together, hand pointing up (geometry)
    Italian,
    /// Thumb and index tip touching, other fingers open (geometry)
    Pinch,
}

impl GestureKind {
    pub const ALL: [GestureKind; 7] = [
        GestureKind::ThumbUp,
        GestureKind::ThumbDown,
        GestureKind::OpenPalm,
        GestureKind::Victory,
        GestureKind::ClosedFist,
        GestureKind::Italian,
        GestureKind::Pinch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbUp => "thumb-up",
            Self::ThumbDown => "thumb-down",
            Self::OpenPalm => "open-palm",
            Self::Victory => "victory",
            Self::ClosedFist => "closed-fist",
            Self::Italian => "italian",
            Self::Pinch => "pinch",
        }
    }

    /// Whether the pose comes from hand geometry rather than the model label
    pub fn is_geometric(&self) -> bool {
        matches!(self, Self::Italian | Self::Pinch)
    }
}

impl From<ModelGesture> for GestureKind {
    fn from(gesture: ModelGesture) -> Self {
        match gesture {
            ModelGesture::ThumbUp => Self::ThumbUp,
            ModelGesture::ThumbDown => Self::ThumbDown,
            ModelGesture::OpenPalm => Self::OpenPalm,
            ModelGesture::Victory => Self::Victory,
            ModelGesture::ClosedFist => Self::ClosedFist,
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame classifier output. `kind == None` means no pose was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureCandidate {
    pub kind: Option<GestureKind>,
    pub confidence: f32,
}

impl GestureCandidate {
    pub fn none() -> Self {
        Self {
            kind: None,
            confidence: 0.0,
        }
    }

    pub fn of(kind: GestureKind, confidence: f32) -> Self {
        Self {
            kind: Some(kind),
            confidence,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind.is_none()
    }
}

impl Default for GestureCandidate {
    fn default() -> Self {
        Self::none()
    }
}

/// Direction of a confirmed swipe, as seen on the mirrored display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_gesture_mapping() {
        assert_eq!(GestureKind::from(ModelGesture::Victory), GestureKind::Victory);
        assert_eq!(GestureKind::from(ModelGesture::ClosedFist), GestureKind::ClosedFist);
    }

    #[test]
    fn test_geometric_kinds() {
        let geometric: Vec<_> = GestureKind::ALL.iter().filter(|k| k.is_geometric()).collect();
        assert_eq!(geometric, vec![&GestureKind::Italian, &GestureKind::Pinch]);
    }

    #[test]
    fn test_swipe_opposite() {
        assert_eq!(SwipeDirection::Left.opposite(), SwipeDirection::Right);
        assert_eq!(SwipeDirection::Right.to_string(), "right");
    }
}
