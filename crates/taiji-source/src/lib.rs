//! Taiji Source - Where landmark frames come from
//!
//! The pipeline pulls one frame at a time and does not know which producer
//! is behind the trait:
//! - Synthetic generator (demo mode, no camera)
//! - JSON lines from an external detector process
//! - In-process channel fed by an async detector
//! - Replay of recorded frames
//!
//! Producers deliver frames in timestamp order.

pub mod channel;
pub mod json_lines;
pub mod replay;
pub mod synthetic;

pub use channel::*;
pub use json_lines::*;
pub use replay::*;
pub use synthetic::*;

use taiji_core::LandmarkFrame;

/// Result of asking a source for its next frame
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePoll {
    Frame(LandmarkFrame),
    /// Nothing ready yet; ask again later
    Pending,
    /// The source will never produce another frame
    Closed,
}

impl SourcePoll {
    pub fn into_frame(self) -> Option<LandmarkFrame> {
        match self {
            SourcePoll::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

/// A producer of landmark frames
pub trait FrameSource {
    fn next_frame(&mut self) -> SourcePoll;

    /// Short label for logs
    fn describe(&self) -> &str {
        "source"
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> SourcePoll {
        (**self).next_frame()
    }

    fn describe(&self) -> &str {
        (**self).describe()
    }
}
