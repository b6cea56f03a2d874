//! Replay of recorded frames

use std::collections::VecDeque;

use taiji_core::LandmarkFrame;

use crate::{FrameSource, SourcePoll};

#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Append a frame to the end of the recording
    pub fn push(&mut self, frame: LandmarkFrame) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FromIterator<LandmarkFrame> for ReplaySource {
    fn from_iter<I: IntoIterator<Item = LandmarkFrame>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> SourcePoll {
        match self.frames.pop_front() {
            Some(frame) => SourcePoll::Frame(frame),
            None => SourcePoll::Closed,
        }
    }

    fn describe(&self) -> &str {
        "replay"
    }
}
