//! Taiji Test Harness - Scenario testing and pipeline validation
//!
//! This crate provides:
//! - Detector chaos (lost frames, occlusion, low confidence, reordering)
//! - Scripted practice sessions driven end to end through the controller
//! - Invariant checks on every evaluated frame

pub mod chaos;
pub mod scenario;

pub use chaos::*;
pub use scenario::*;
