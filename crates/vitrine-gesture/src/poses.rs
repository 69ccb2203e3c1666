//! Reference hand poses in normalized image coordinates.
//!
//! Used to calibrate classifier thresholds against a known-good skeleton and
//! to drive the pipeline without a camera. Every pose has a hand size
//! (wrist to middle knuckle) of 0.1 and points up the image.

use vitrine_core::{HandLandmark, HandLandmarks, Landmark};

/// Offsets of the four finger knuckles from the wrist: index, middle, ring, pinky
const KNUCKLES: [(f64, f64); 4] = [(-0.03, -0.09), (0.0, -0.1), (0.025, -0.095), (0.045, -0.085)];

/// Reach of an extended finger beyond its knuckle
const FINGER_LENGTH: f64 = 0.085;

struct PoseBuilder {
    wrist: (f64, f64),
    points: [Landmark; HandLandmark::COUNT],
}

impl PoseBuilder {
    fn new(wrist_x: f64, wrist_y: f64) -> Self {
        let mut builder = Self {
            wrist: (wrist_x, wrist_y),
            points: [Landmark::planar(wrist_x, wrist_y); HandLandmark::COUNT],
        };
        builder.set(HandLandmark::ThumbCmc, (-0.03, -0.03));
        builder.set(HandLandmark::ThumbMcp, (-0.05, -0.05));
        builder.set(HandLandmark::ThumbIp, (-0.065, -0.07));
        for (finger, offset) in KNUCKLES.iter().enumerate() {
            builder.set_index(5 + finger * 4, *offset);
        }
        builder
    }

    fn set(&mut self, landmark: HandLandmark, offset: (f64, f64)) {
        self.set_index(landmark.index(), offset);
    }

    fn set_index(&mut self, index: usize, (dx, dy): (f64, f64)) {
        self.points[index] = Landmark::planar(self.wrist.0 + dx, self.wrist.1 + dy);
    }

    /// Straight finger from its knuckle to `tip` (offsets from the wrist)
    fn extend(&mut self, finger: usize, tip: (f64, f64)) -> &mut Self {
        let base = 5 + finger * 4;
        let mcp = KNUCKLES[finger];
        let lerp = |t: f64| (mcp.0 + (tip.0 - mcp.0) * t, mcp.1 + (tip.1 - mcp.1) * t);
        self.set_index(base + 1, lerp(0.45));
        self.set_index(base + 2, lerp(0.75));
        self.set_index(base + 3, tip);
        self
    }

    /// Finger curled back toward the palm
    fn fold(&mut self, finger: usize) -> &mut Self {
        let base = 5 + finger * 4;
        let (mx, my) = KNUCKLES[finger];
        self.set_index(base + 1, (mx, my - 0.03));
        self.set_index(base + 2, (mx, my - 0.01));
        self.set_index(base + 3, (mx, my + 0.01));
        self
    }

    fn upright(&mut self, finger: usize) -> &mut Self {
        let (mx, my) = KNUCKLES[finger];
        self.extend(finger, (mx, my - FINGER_LENGTH))
    }

    fn thumb_tip(&mut self, offset: (f64, f64)) -> &mut Self {
        self.set(HandLandmark::ThumbTip, offset);
        self
    }

    fn build(&self) -> HandLandmarks {
        HandLandmarks::from_array(self.points)
    }
}

/// All five fingers spread and extended
pub fn open_hand(wrist_x: f64, wrist_y: f64) -> HandLandmarks {
    PoseBuilder::new(wrist_x, wrist_y)
        .upright(0)
        .upright(1)
        .upright(2)
        .upright(3)
        .thumb_tip((-0.09, -0.09))
        .build()
}

/// Index finger extended, others curled, thumb tucked
pub fn pointing_hand(wrist_x: f64, wrist_y: f64) -> HandLandmarks {
    PoseBuilder::new(wrist_x, wrist_y)
        .upright(0)
        .fold(1)
        .fold(2)
        .fold(3)
        .thumb_tip((-0.01, -0.07))
        .build()
}

/// Every finger curled into the palm
pub fn fist_hand(wrist_x: f64, wrist_y: f64) -> HandLandmarks {
    PoseBuilder::new(wrist_x, wrist_y)
        .fold(0)
        .fold(1)
        .fold(2)
        .fold(3)
        .thumb_tip((-0.01, -0.07))
        .build()
}

/// All fingertips pinched together high above the wrist
pub fn italian_hand(wrist_x: f64, wrist_y: f64) -> HandLandmarks {
    bunched_hand(wrist_x, wrist_y, (0.0, -0.2))
}

/// All fingertips pinched together around `center` (offset from the wrist)
pub fn bunched_hand(wrist_x: f64, wrist_y: f64, center: (f64, f64)) -> HandLandmarks {
    let (cx, cy) = center;
    PoseBuilder::new(wrist_x, wrist_y)
        .extend(0, (cx - 0.01, cy))
        .extend(1, (cx, cy - 0.01))
        .extend(2, (cx + 0.01, cy))
        .extend(3, (cx, cy + 0.01))
        .thumb_tip((cx - 0.01, cy + 0.01))
        .build()
}

/// Thumb and index tips touching, remaining fingers open ("OK" sign)
pub fn pinch_hand(wrist_x: f64, wrist_y: f64) -> HandLandmarks {
    PoseBuilder::new(wrist_x, wrist_y)
        .extend(0, (-0.06, -0.12))
        .upright(1)
        .upright(2)
        .upright(3)
        .thumb_tip((-0.07, -0.115))
        .build()
}
