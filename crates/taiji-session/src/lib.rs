//! Taiji Session - Folding evaluated frames into session statistics
//!
//! This crate implements the stateful end of the pipeline:
//! - Session lifecycle (Idle -> Active <-> Paused -> Stopped, reset from anywhere)
//! - Frame count and running mean accuracy
//! - Optional per-frame history
//! - Practice goals and progress
//! - A shared handle that serializes writers

pub mod goals;
pub mod handle;
pub mod session;

pub use goals::*;
pub use handle::*;
pub use session::*;
