//! Taiji Pose - From landmarks to a posture verdict
//!
//! This crate implements the pure half of the pipeline:
//! - Angle at a vertex from three landmarks
//! - Joint table extraction (frame -> named angle map)
//! - Tolerance bands describing the reference posture
//! - Frame evaluation (per-joint verdicts, accuracy, status)
//! - Localized feedback messages
//!
//! Nothing here holds state between frames.

pub mod angle;
pub mod evaluate;
pub mod feedback;
pub mod joint;
pub mod tolerance;

pub use angle::*;
pub use evaluate::*;
pub use feedback::*;
pub use joint::*;
pub use tolerance::*;
