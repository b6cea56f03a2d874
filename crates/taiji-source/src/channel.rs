//! Channel-fed source
//!
//! An async detector task pushes frames into a bounded mpsc channel; the
//! pipeline drains it without blocking.

use taiji_core::LandmarkFrame;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::{FrameSource, SourcePoll};

pub type FrameSender = mpsc::Sender<LandmarkFrame>;

pub struct ChannelSource {
    rx: mpsc::Receiver<LandmarkFrame>,
}

impl ChannelSource {
    /// Create a source with a bounded queue of `capacity` frames
    pub fn new(capacity: usize) -> (FrameSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: mpsc::Receiver<LandmarkFrame>) -> Self {
        Self { rx }
    }
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> SourcePoll {
        match self.rx.try_recv() {
            Ok(frame) => SourcePoll::Frame(frame),
            Err(TryRecvError::Empty) => SourcePoll::Pending,
            Err(TryRecvError::Disconnected) => SourcePoll::Closed,
        }
    }

    fn describe(&self) -> &str {
        "channel"
    }
}
