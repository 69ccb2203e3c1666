//! Tunable settings for the gesture pipeline.
//!
//! Every section has defaults, so a settings file only needs the keys it
//! overrides. Environment variables use the `VITRINE` prefix with `__` as the
//! section separator, e.g. `VITRINE_STABILIZER__HOLD_DURATION_MS=1500`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrineConfig {
    /// Geometric classifier thresholds
    pub classifier: ClassifierSettings,

    /// Dwell confirmation timing
    pub stabilizer: StabilizerSettings,

    /// Swipe motion detection
    pub swipe: SwipeSettings,

    /// Re-trigger throttling
    pub cooldown: CooldownSettings,

    /// Cross-modal action lock
    pub lock: LockSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Maximum thumb-to-index tip distance for a pinch (normalized units)
    pub pinch_threshold: f64,

    /// Minimum confidence for accepting a model-supplied label
    pub min_label_confidence: f32,

    /// Wrist must sit this far below every fingertip (normalized units)
    pub italian_orientation_margin: f64,

    /// Max horizontal centroid-to-wrist offset, in hand sizes
    pub italian_skew_factor: f64,

    /// Max fingertip-to-centroid distance, in hand sizes
    pub italian_bunch_factor: f64,

    /// Min centroid-to-wrist distance, in hand sizes
    pub italian_reach_factor: f64,

    /// Other fingertips must stay under this fraction of the index reach
    pub pointing_dominance_ratio: f64,

    /// Index tip reach must exceed this multiple of the index knuckle reach
    pub pointing_extension_ratio: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
            min_label_confidence: 0.5,
            italian_orientation_margin: 0.05,
            italian_skew_factor: 0.8,
            italian_bunch_factor: 0.25,
            italian_reach_factor: 1.5,
            pointing_dominance_ratio: 0.8,
            pointing_extension_ratio: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerSettings {
    /// How long a pose must be held before it fires (ms)
    pub hold_duration_ms: u64,

    /// After firing, the hold timer restarts this far in the future (ms)
    pub rearm_offset_ms: u64,

    /// Interrupted holds past this progress report a failure
    pub failure_progress: f64,
}

impl Default for StabilizerSettings {
    fn default() -> Self {
        Self {
            hold_duration_ms: 2000,
            rearm_offset_ms: 1000,
            failure_progress: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeSettings {
    /// Horizontal wrist travel that triggers a swipe (normalized units)
    pub base_threshold: f64,

    /// Threshold multiplier for reversing the last swipe direction
    pub reverse_multiplier: f64,

    /// Anchors older than this are abandoned (ms)
    pub anchor_timeout_ms: u64,

    /// Reject when |dy| exceeds this multiple of |dx|
    pub vertical_ratio: f64,

    /// Per-frame horizontal travel below which the hand counts as still
    pub stillness_velocity: f64,

    /// Consecutive still frames that clear the remembered direction
    pub stillness_frames: u32,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        Self {
            base_threshold: 0.15,
            reverse_multiplier: 2.3,
            anchor_timeout_ms: 800,
            vertical_ratio: 2.0,
            stillness_velocity: 0.01,
            stillness_frames: 10,
        }
    }
}

impl SwipeSettings {
    pub fn reverse_threshold(&self) -> f64 {
        self.base_threshold * self.reverse_multiplier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    /// Minimum interval between two swipes (ms)
    pub swipe_ms: u64,

    /// Minimum interval between two firings of the same pose gesture (ms).
    /// Pose gestures are already throttled by the stabilizer re-arm, so this
    /// defaults to zero.
    pub pose_ms: u64,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            swipe_ms: 600,
            pose_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// A held lock self-expires after this long (ms)
    pub timeout_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self { timeout_ms: 300 }
    }
}

impl VitrineConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("VITRINE").separator("__"))
            .build()?;

        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("VITRINE").separator("__"))
            .build()?;

        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings that would disable or invert a safeguard
    pub fn validate(&self) -> Result<()> {
        if self.stabilizer.hold_duration_ms == 0 {
            return Err(Error::Config("stabilizer.hold_duration_ms must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.stabilizer.failure_progress) {
            return Err(Error::Config("stabilizer.failure_progress must be in [0, 1)".into()));
        }
        if self.lock.timeout_ms == 0 {
            return Err(Error::Config("lock.timeout_ms must be positive".into()));
        }
        if self.swipe.base_threshold <= 0.0 {
            return Err(Error::Config("swipe.base_threshold must be positive".into()));
        }
        if self.swipe.reverse_multiplier < 1.0 {
            return Err(Error::Config("swipe.reverse_multiplier must be at least 1".into()));
        }
        if self.swipe.stillness_frames == 0 || self.swipe.anchor_timeout_ms == 0 {
            return Err(Error::Config(
                "swipe.stillness_frames and swipe.anchor_timeout_ms must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.min_label_confidence) {
            return Err(Error::Config(
                "classifier.min_label_confidence must be in [0, 1]".into(),
            ));
        }
        if self.classifier.pinch_threshold <= 0.0 {
            return Err(Error::Config("classifier.pinch_threshold must be positive".into()));
        }
        Ok(())
    }
}
