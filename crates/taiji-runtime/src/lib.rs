//! Taiji Runtime - Frame loop orchestration
//!
//! The controller drives one frame at a time through these stages:
//! 1. Pull a frame from the source
//! 2. Drop it if it is older than the last accepted frame
//! 3. Extract joint angles
//! 4. Evaluate against the reference posture
//! 5. Fold into the session (only while Active)
//! 6. Publish the report to subscribers
//!
//! This crate also owns reference posture loading and tracing setup.

pub mod config;
pub mod controller;
pub mod posture;
pub mod telemetry;

pub use config::*;
pub use controller::*;
pub use posture::*;
pub use telemetry::*;
