//! Hand landmark contract between the external pose model and the gesture core.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Timestamp;

/// How far outside [0, 1] a normalized x/y may land before the frame is rejected.
/// Trackers extrapolate slightly off-frame while the hand leaves the camera view.
pub const COORDINATE_TOLERANCE: f64 = 0.25;

/// 21-landmark hand topology (MediaPipe convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    /// All five fingertips, thumb first
    pub const FINGERTIPS: [HandLandmark; 5] = [
        HandLandmark::ThumbTip,
        HandLandmark::IndexTip,
        HandLandmark::MiddleTip,
        HandLandmark::RingTip,
        HandLandmark::PinkyTip,
    ];

    pub fn from_index(idx: u8) -> Option<Self> {
        use HandLandmark::*;
        const ORDER: [HandLandmark; HandLandmark::COUNT] = [
            Wrist, ThumbCmc, ThumbMcp, ThumbIp, ThumbTip, IndexMcp, IndexPip, IndexDip, IndexTip,
            MiddleMcp, MiddlePip, MiddleDip, MiddleTip, RingMcp, RingPip, RingDip, RingTip,
            PinkyMcp, PinkyPip, PinkyDip, PinkyTip,
        ];
        ORDER.get(idx as usize).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Single normalized landmark (x, y in image space, z relative depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn to_point3(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Validated set of 21 landmarks for one hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    points: [Landmark; HandLandmark::COUNT],
}

impl HandLandmarks {
    /// Build from raw `[x, y]` or `[x, y, z]` tuples, validating count and range.
    pub fn from_points(raw: &[Vec<f64>]) -> Result<Self> {
        if raw.len() != HandLandmark::COUNT {
            return Err(Error::LandmarkCount {
                expected: HandLandmark::COUNT,
                actual: raw.len(),
            });
        }

        let mut points = [Landmark::default(); HandLandmark::COUNT];
        for (index, coords) in raw.iter().enumerate() {
            let (x, y, z) = match coords.as_slice() {
                [x, y] => (*x, *y, 0.0),
                [x, y, z] => (*x, *y, *z),
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "landmark {} has {} components, expected 2 or 3",
                        index,
                        coords.len()
                    )))
                }
            };
            for value in [x, y] {
                if !value.is_finite()
                    || value < -COORDINATE_TOLERANCE
                    || value > 1.0 + COORDINATE_TOLERANCE
                {
                    return Err(Error::LandmarkCoordinate { index, value });
                }
            }
            if !z.is_finite() {
                return Err(Error::LandmarkCoordinate { index, value: z });
            }
            points[index] = Landmark::new(x, y, z);
        }

        Ok(Self { points })
    }

    /// Build from an already-typed array (no range validation; used by tests and synthetic input)
    pub fn from_array(points: [Landmark; HandLandmark::COUNT]) -> Self {
        Self { points }
    }

    pub fn get(&self, landmark: HandLandmark) -> Landmark {
        self.points[landmark.index()]
    }

    pub fn wrist(&self) -> Landmark {
        self.get(HandLandmark::Wrist)
    }

    pub fn points(&self) -> &[Landmark; HandLandmark::COUNT] {
        &self.points
    }
}

/// Coarse gesture labels the external model may attach to a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelGesture {
    ThumbUp,
    ThumbDown,
    OpenPalm,
    Victory,
    ClosedFist,
}

impl ModelGesture {
    /// Parse a model label name. Labels the kiosk does not act on return `None`.
    pub fn from_label(name: &str) -> Option<Self> {
        match name {
            "Thumb_Up" => Some(Self::ThumbUp),
            "Thumb_Down" => Some(Self::ThumbDown),
            "Open_Palm" => Some(Self::OpenPalm),
            "Victory" => Some(Self::Victory),
            "Closed_Fist" => Some(Self::ClosedFist),
            _ => None,
        }
    }
}

/// Model-supplied label with its confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelLabel {
    pub gesture: ModelGesture,
    pub confidence: f32,
}

impl ModelLabel {
    pub fn new(gesture: ModelGesture, confidence: f32) -> Self {
        Self {
            gesture,
            confidence,
        }
    }
}

/// One detected hand: landmarks plus optional coarse label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: HandLandmarks,
    pub label: Option<ModelLabel>,
}

impl HandObservation {
    pub fn new(landmarks: HandLandmarks) -> Self {
        Self {
            landmarks,
            label: None,
        }
    }

    pub fn with_label(mut self, label: ModelLabel) -> Self {
        self.label = Some(label);
        self
    }
}

/// Per-tick model output. `hand == None` means no hand in view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub timestamp: Timestamp,
    pub hand: Option<HandObservation>,
}

#[derive(Deserialize)]
struct RawFrame {
    timestamp_ms: i64,
    #[serde(default)]
    hand: Option<RawHand>,
}

#[derive(Deserialize)]
struct RawHand {
    landmarks: Vec<Vec<f64>>,
    #[serde(default)]
    label: Option<RawLabel>,
}

#[derive(Deserialize)]
struct RawLabel {
    name: String,
    score: f32,
}

impl HandFrame {
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            hand: None,
        }
    }

    pub fn with_hand(timestamp: Timestamp, hand: HandObservation) -> Self {
        Self {
            timestamp,
            hand: Some(hand),
        }
    }

    /// Parse and validate the model's JSON result for one tick.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFrame = serde_json::from_str(json)?;
        let timestamp = Timestamp::from_millis(raw.timestamp_ms);

        let Some(raw_hand) = raw.hand else {
            return Ok(Self::empty(timestamp));
        };
        // An empty landmark list is how some runtimes signal "no hand"
        if raw_hand.landmarks.is_empty() {
            return Ok(Self::empty(timestamp));
        }

        let landmarks = HandLandmarks::from_points(&raw_hand.landmarks)?;
        let label = match raw_hand.label {
            Some(raw_label) => {
                if !raw_label.score.is_finite() || !(0.0..=1.0).contains(&raw_label.score) {
                    return Err(Error::LabelConfidence(raw_label.score));
                }
                ModelGesture::from_label(&raw_label.name)
                    .map(|gesture| ModelLabel::new(gesture, raw_label.score))
            }
            None => None,
        };

        Ok(Self::with_hand(timestamp, HandObservation { landmarks, label }))
    }

    pub fn has_hand(&self) -> bool {
        self.hand.is_some()
    }
}
