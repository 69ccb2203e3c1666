//! Planar geometry over normalized hand landmarks.
//!
//! All distances are measured in the image plane. The model's z estimate is
//! too noisy at kiosk distances to take part in threshold comparisons.

use nalgebra::{distance, Point2};

use crate::landmarks::{HandLandmark, HandLandmarks, Landmark};

/// Euclidean distance between two landmarks in the image plane
pub fn planar_distance(a: &Landmark, b: &Landmark) -> f64 {
    distance(&a.to_point2(), &b.to_point2())
}

/// Distance between two named landmarks of the same hand
pub fn landmark_distance(hand: &HandLandmarks, a: HandLandmark, b: HandLandmark) -> f64 {
    planar_distance(&hand.get(a), &hand.get(b))
}

/// Reference hand size: wrist to middle-finger knuckle.
///
/// Thresholds expressed as multiples of this are invariant to how far the
/// shopper stands from the camera.
pub fn hand_size(hand: &HandLandmarks) -> f64 {
    landmark_distance(hand, HandLandmark::Wrist, HandLandmark::MiddleMcp)
}

/// Mean position of a set of landmarks, `None` for an empty set
pub fn centroid(points: &[Landmark]) -> Option<Point2<f64>> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));

    Some(Point2::new(sum_x / n, sum_y / n))
}

/// Centroid of the five fingertips
pub fn fingertip_centroid(hand: &HandLandmarks) -> Point2<f64> {
    let tips = HandLandmark::FINGERTIPS.map(|lm| hand.get(lm));
    // Five points, never empty
    centroid(&tips).unwrap_or_else(|| hand.wrist().to_point2())
}

/// Whether a finger's tip reaches farther from the wrist than its knuckle
pub fn is_finger_extended(hand: &HandLandmarks, tip: HandLandmark, knuckle: HandLandmark) -> bool {
    let wrist = hand.wrist();
    planar_distance(&hand.get(tip), &wrist) > planar_distance(&hand.get(knuckle), &wrist)
}
