//! Fundamental types for the Vitrine kiosk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_millis(&self) -> i64 {
        self.0 / 1_000_000
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier` is in the future)
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000_000.0
    }

    /// Shift forward by a number of milliseconds
    pub fn plus_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add((millis as i64).saturating_mul(1_000_000)))
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// Input modality contending for the shared action lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSource {
    Voice,
    Gesture,
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSource::Voice => "voice",
            InputSource::Gesture => "gesture",
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppMode {
    /// Coverflow over the (filtered) catalog
    #[default]
    Browse,
    /// Single product detail view
    Details,
    /// Cart list with an active row
    Cart,
    /// Order review before purchase
    Checkout,
}

impl AppMode {
    pub const ALL: [AppMode; 4] = [
        AppMode::Browse,
        AppMode::Details,
        AppMode::Cart,
        AppMode::Checkout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Browse => "BROWSE",
            AppMode::Details => "DETAILS",
            AppMode::Cart => "CART",
            AppMode::Checkout => "CHECKOUT",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
