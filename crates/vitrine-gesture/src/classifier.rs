//! Single-frame geometric gesture classification.
//!
//! ## Precedence
//!
//! 1. Italian (geometry): most specific pose, checked first
//! 2. Pinch (geometry)
//! 3. Model label, if its confidence clears the minimum
//!
//! Pointing is not a gesture of its own; it gates the swipe detector.

use tracing::trace;

use vitrine_core::{
    fingertip_centroid, hand_size, is_finger_extended, landmark_distance, planar_distance,
    ClassifierSettings, HandLandmark, HandLandmarks, HandObservation,
};

use crate::gesture::{GestureCandidate, GestureKind};

/// Confidence reported for poses detected from geometry
pub const GEOMETRIC_CONFIDENCE: f32 = 1.0;

/// Below this hand size the skeleton is degenerate (hand edge-on or far away)
const MIN_HAND_SIZE: f64 = 1e-4;

/// Stateless per-frame classifier
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    settings: ClassifierSettings,
}

impl GestureClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    /// Classify one frame's hand. `None` (no hand) always yields an empty candidate.
    pub fn classify(&self, hand: Option<&HandObservation>) -> GestureCandidate {
        let Some(hand) = hand else {
            return GestureCandidate::none();
        };

        if is_italian(&hand.landmarks, &self.settings) {
            return GestureCandidate::of(GestureKind::Italian, GEOMETRIC_CONFIDENCE);
        }

        if is_pinch(&hand.landmarks, &self.settings) {
            return GestureCandidate::of(GestureKind::Pinch, GEOMETRIC_CONFIDENCE);
        }

        match hand.label {
            Some(label) if label.confidence > self.settings.min_label_confidence => {
                GestureCandidate::of(label.gesture.into(), label.confidence)
            }
            Some(label) => {
                trace!(
                    "Ignoring low-confidence label {:?} ({:.2})",
                    label.gesture,
                    label.confidence
                );
                GestureCandidate::none()
            }
            None => GestureCandidate::none(),
        }
    }

    /// Whether the hand is in the pointing pose that arms swipe tracking
    pub fn is_pointing(&self, hand: &HandLandmarks) -> bool {
        is_pointing(hand, &self.settings)
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }
}

/// Fingertips bunched together, hand held upright and open.
///
/// All four guards must pass:
/// - orientation: wrist below every fingertip by the margin
/// - skew: fingertip centroid horizontally over the wrist
/// - bunching: every fingertip close to the centroid
/// - reach: centroid far from the wrist (a fist also bunches, but at the palm)
pub fn is_italian(hand: &HandLandmarks, settings: &ClassifierSettings) -> bool {
    let size = hand_size(hand);
    if size < MIN_HAND_SIZE {
        return false;
    }

    let wrist = hand.wrist();
    let tips = HandLandmark::FINGERTIPS.map(|lm| hand.get(lm));

    // Image y grows downward
    let upright = tips
        .iter()
        .all(|tip| wrist.y - tip.y > settings.italian_orientation_margin);
    if !upright {
        return false;
    }

    let centroid = fingertip_centroid(hand);
    if (centroid.x - wrist.x).abs() >= settings.italian_skew_factor * size {
        return false;
    }

    let bunch_limit = settings.italian_bunch_factor * size;
    let bunched = tips
        .iter()
        .all(|tip| nalgebra::distance(&tip.to_point2(), &centroid) <= bunch_limit);
    if !bunched {
        return false;
    }

    nalgebra::distance(&centroid, &wrist.to_point2()) >= settings.italian_reach_factor * size
}

/// Thumb and index tips touching while the other three fingers stay open
pub fn is_pinch(hand: &HandLandmarks, settings: &ClassifierSettings) -> bool {
    let gap = landmark_distance(hand, HandLandmark::ThumbTip, HandLandmark::IndexTip);
    if gap >= settings.pinch_threshold {
        return false;
    }

    [
        (HandLandmark::MiddleTip, HandLandmark::MiddlePip),
        (HandLandmark::RingTip, HandLandmark::RingPip),
        (HandLandmark::PinkyTip, HandLandmark::PinkyPip),
    ]
    .iter()
    .all(|(tip, pip)| is_finger_extended(hand, *tip, *pip))
}

/// Index finger is the single dominant extended digit
pub fn is_pointing(hand: &HandLandmarks, settings: &ClassifierSettings) -> bool {
    let wrist = hand.wrist();
    let index_reach = planar_distance(&hand.get(HandLandmark::IndexTip), &wrist);
    let knuckle_reach = planar_distance(&hand.get(HandLandmark::IndexMcp), &wrist);

    if index_reach <= settings.pointing_extension_ratio * knuckle_reach {
        return false;
    }

    let limit = settings.pointing_dominance_ratio * index_reach;
    [
        HandLandmark::MiddleTip,
        HandLandmark::RingTip,
        HandLandmark::PinkyTip,
    ]
    .iter()
    .all(|tip| planar_distance(&hand.get(*tip), &wrist) < limit)
}
