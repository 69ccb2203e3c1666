//! # Vitrine-Core
//!
//! Core types shared by the Vitrine multimodal retail kiosk: the hand
//! landmark contract produced by the external pose model, timestamps,
//! application modes, input sources and layered settings.
//!
//! ## Frame Contract
//!
//! The pose model emits, once per animation tick, either nothing (no hand)
//! or 21 normalized landmark points in the MediaPipe hand topology:
//!
//! ```text
//!            8   12  16  20      fingertips
//!            |   |   |   |
//!            5   9   13  17      knuckles (MCP)
//!      4      \  |   |  /
//!       \      \ |   | /
//!        1 ----- 0 -----         wrist
//! ```
//!
//! plus an optional coarse label (`Thumb_Up`, `Victory`, ...) with a
//! confidence score. Everything is validated once in [`HandFrame::from_json`]
//! or [`HandLandmarks::from_points`]; downstream code indexes by
//! [`HandLandmark`] and never re-checks bounds.

pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod settings;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use landmarks::*;
pub use settings::*;
pub use types::*;
