//! Detector chaos
//!
//! Wraps any frame source and degrades what it produces the way a real
//! detector misbehaves:
//! - Lost frames
//! - Occluded landmarks
//! - Low confidence points
//! - Late frames overtaken by newer ones
//! - Duplicated frames

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use taiji_core::LandmarkFrame;
use taiji_source::{FrameSource, SourcePoll};

/// Visibility assigned to points degraded to low confidence
pub const LOW_VISIBILITY: f64 = 0.1;

/// Chaos configuration; all values are probabilities in [0, 1]
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Whole frame lost
    pub frame_loss: f64,
    /// Per landmark: slot emptied
    pub occlusion: f64,
    /// Per landmark: visibility dropped to `LOW_VISIBILITY`
    pub low_visibility: f64,
    /// Frame held back and delivered after the next one
    pub reorder_prob: f64,
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            frame_loss: 0.01,
            occlusion: 0.02,
            low_visibility: 0.02,
            reorder_prob: 0.02,
            duplicate_prob: 0.01,
        }
    }
}

impl ChaosConfig {
    /// Pass-through
    pub fn clean() -> Self {
        ChaosConfig {
            frame_loss: 0.0,
            occlusion: 0.0,
            low_visibility: 0.0,
            reorder_prob: 0.0,
            duplicate_prob: 0.0,
        }
    }

    /// Dim room, partly out of frame
    pub fn poor() -> Self {
        ChaosConfig {
            frame_loss: 0.05,
            occlusion: 0.10,
            low_visibility: 0.10,
            reorder_prob: 0.05,
            duplicate_prob: 0.02,
        }
    }

    /// Detector barely keeping up
    pub fn hostile() -> Self {
        ChaosConfig {
            frame_loss: 0.15,
            occlusion: 0.30,
            low_visibility: 0.20,
            reorder_prob: 0.20,
            duplicate_prob: 0.05,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChaosStats {
    pub frames_in: u64,
    pub frames_out: u64,
    pub frames_lost: u64,
    pub frames_reordered: u64,
    pub frames_duplicated: u64,
    pub landmarks_occluded: u64,
    pub landmarks_dimmed: u64,
}

/// Frame source wrapper that injects detector faults
pub struct ChaosSource<S> {
    inner: S,
    config: ChaosConfig,
    rng: StdRng,
    held: Option<LandmarkFrame>,
    ready: VecDeque<LandmarkFrame>,
    stats: ChaosStats,
}

impl<S: FrameSource> ChaosSource<S> {
    pub fn new(inner: S, config: ChaosConfig, seed: u64) -> Self {
        ChaosSource {
            inner,
            config,
            rng: StdRng::seed_from_u64(seed),
            held: None,
            ready: VecDeque::new(),
            stats: ChaosStats::default(),
        }
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.gen_bool(p.min(1.0))
    }

    fn admit(&mut self, mut frame: LandmarkFrame) {
        self.stats.frames_in += 1;

        if self.chance(self.config.frame_loss) {
            self.stats.frames_lost += 1;
            return;
        }

        self.degrade(&mut frame);

        // A held frame goes out behind the newer one
        if let Some(late) = self.held.take() {
            self.ready.push_back(frame);
            self.ready.push_back(late);
            self.stats.frames_reordered += 1;
            return;
        }

        if self.chance(self.config.reorder_prob) {
            self.held = Some(frame);
            return;
        }

        if self.chance(self.config.duplicate_prob) {
            self.ready.push_back(frame.clone());
            self.stats.frames_duplicated += 1;
        }
        self.ready.push_back(frame);
    }

    fn degrade(&mut self, frame: &mut LandmarkFrame) {
        let (occlusion, dim) = (self.config.occlusion, self.config.low_visibility);
        for slot in frame.points.iter_mut() {
            if slot.is_none() {
                continue;
            }
            if self.chance(occlusion) {
                *slot = None;
                self.stats.landmarks_occluded += 1;
            } else if self.chance(dim) {
                if let Some(point) = slot.as_mut() {
                    point.visibility = Some(LOW_VISIBILITY);
                }
                self.stats.landmarks_dimmed += 1;
            }
        }
    }

    fn emit(&mut self, frame: LandmarkFrame) -> SourcePoll {
        self.stats.frames_out += 1;
        SourcePoll::Frame(frame)
    }
}

impl<S: FrameSource> FrameSource for ChaosSource<S> {
    fn next_frame(&mut self) -> SourcePoll {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return self.emit(frame);
            }
            match self.inner.next_frame() {
                SourcePoll::Frame(frame) => self.admit(frame),
                SourcePoll::Pending => return SourcePoll::Pending,
                SourcePoll::Closed => {
                    return match self.held.take() {
                        Some(late) => self.emit(late),
                        None => SourcePoll::Closed,
                    };
                }
            }
        }
    }

    fn describe(&self) -> &str {
        "chaos"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiji_core::Timestamp;
    use taiji_source::{ReplaySource, SyntheticConfig, SyntheticSource};

    fn stamps(source: &mut impl FrameSource) -> Vec<i64> {
        std::iter::from_fn(|| source.next_frame().into_frame())
            .map(|f| f.timestamp.as_millis())
            .collect()
    }

    fn replay(n: i64) -> ReplaySource {
        (0..n)
            .map(|i| LandmarkFrame::empty(Timestamp::from_millis(i * 100)))
            .collect()
    }

    #[test]
    fn test_clean_chaos_is_transparent() {
        let mut chaos = ChaosSource::new(replay(10), ChaosConfig::clean(), 1);
        let out = stamps(&mut chaos);

        assert_eq!(out, (0..10).map(|i| i * 100).collect::<Vec<_>>());
        assert_eq!(chaos.stats().frames_in, 10);
        assert_eq!(chaos.stats().frames_out, 10);
    }

    #[test]
    fn test_total_loss_yields_nothing() {
        let config = ChaosConfig {
            frame_loss: 1.0,
            ..ChaosConfig::clean()
        };
        let mut chaos = ChaosSource::new(replay(5), config, 1);
        assert!(stamps(&mut chaos).is_empty());
        assert_eq!(chaos.stats().frames_lost, 5);
    }

    #[test]
    fn test_reorder_swaps_neighbours() {
        let config = ChaosConfig {
            reorder_prob: 1.0,
            ..ChaosConfig::clean()
        };
        let mut chaos = ChaosSource::new(replay(4), config, 1);

        // Every other frame is held and overtaken; the last one is flushed
        assert_eq!(stamps(&mut chaos), vec![100, 0, 300, 200]);
        assert_eq!(chaos.stats().frames_reordered, 2);
    }

    #[test]
    fn test_duplicate_repeats_frame() {
        let config = ChaosConfig {
            duplicate_prob: 1.0,
            ..ChaosConfig::clean()
        };
        let mut chaos = ChaosSource::new(replay(2), config, 1);
        assert_eq!(stamps(&mut chaos), vec![0, 0, 100, 100]);
    }

    #[test]
    fn test_occlusion_and_dimming_touch_points_only() {
        let synthetic = SyntheticSource::new(SyntheticConfig {
            limit: Some(1),
            ..Default::default()
        });
        let config = ChaosConfig {
            occlusion: 1.0,
            ..ChaosConfig::clean()
        };
        let mut chaos = ChaosSource::new(synthetic, config, 7);
        let frame = chaos.next_frame().into_frame().unwrap();
        assert_eq!(frame.present(), 0);
        assert_eq!(chaos.stats().landmarks_occluded, taiji_core::LANDMARK_COUNT as u64);

        let synthetic = SyntheticSource::new(SyntheticConfig {
            limit: Some(1),
            ..Default::default()
        });
        let config = ChaosConfig {
            low_visibility: 1.0,
            ..ChaosConfig::clean()
        };
        let mut chaos = ChaosSource::new(synthetic, config, 7);
        let frame = chaos.next_frame().into_frame().unwrap();
        assert_eq!(frame.present(), taiji_core::LANDMARK_COUNT);
        assert!(frame.points.iter().flatten().all(|p| p.visibility == Some(LOW_VISIBILITY)));
    }
}
