//! Taiji Core - Fundamental types shared by the posture pipeline
//!
//! This crate defines the types every other crate speaks:
//! - Time primitives (Timestamp, Clock)
//! - Landmark data (Landmark, Point, LandmarkFrame)
//! - The error taxonomy for configuration failures

pub mod error;
pub mod landmark;
pub mod time;

pub use error::*;
pub use landmark::*;
pub use time::*;
