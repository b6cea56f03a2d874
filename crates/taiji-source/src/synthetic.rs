//! Synthetic frame generator - demo mode without a camera
//!
//! Builds a planar skeleton whose joint angles equal a base pose plus
//! uniform jitter, so the frames exercise the real extraction path instead
//! of carrying precomputed angles.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use taiji_core::{Landmark, LandmarkFrame, Point, Timestamp};

use crate::{FrameSource, SourcePoll};

/// Angles for one side of the body, degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbAngles {
    pub elbow: f64,
    pub shoulder: f64,
    pub hip: f64,
    pub knee: f64,
}

impl LimbAngles {
    /// Tai Chi fundamentals stance
    pub fn base_stance() -> Self {
        LimbAngles {
            elbow: 125.0,
            shoulder: 100.0,
            hip: 170.0,
            knee: 165.0,
        }
    }

    /// Spread either side of the base stance
    pub fn demo_jitter() -> Self {
        LimbAngles {
            elbow: 10.0,
            shoulder: 12.5,
            hip: 5.0,
            knee: 7.5,
        }
    }

    pub fn zero() -> Self {
        LimbAngles {
            elbow: 0.0,
            shoulder: 0.0,
            hip: 0.0,
            knee: 0.0,
        }
    }
}

/// Synthetic source configuration
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub base: LimbAngles,
    /// Half-width of the uniform jitter applied per joint per frame
    pub jitter: LimbAngles,
    /// Spacing between frame timestamps
    pub frame_interval: Duration,
    /// Timestamp of the first frame
    pub start: Timestamp,
    /// Visibility reported on every point
    pub visibility: f64,
    /// Probability that a landmark slot is left empty
    pub dropout: f64,
    /// Stop after this many frames
    pub limit: Option<u64>,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            base: LimbAngles::base_stance(),
            jitter: LimbAngles::demo_jitter(),
            frame_interval: Duration::from_millis(100),
            start: Timestamp::ZERO,
            visibility: 0.9,
            dropout: 0.0,
            limit: None,
            seed: 42,
        }
    }
}

/// Seeded skeleton generator
pub struct SyntheticSource {
    config: SyntheticConfig,
    rng: StdRng,
    next_timestamp: Timestamp,
    produced: u64,
}

// Segment lengths, normalized image units
const UPPER_ARM: f64 = 0.15;
const FOREARM: f64 = 0.13;
const THIGH: f64 = 0.20;
const SHIN: f64 = 0.19;

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        SyntheticSource {
            rng: StdRng::seed_from_u64(config.seed),
            next_timestamp: config.start,
            produced: 0,
            config,
        }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Frames produced so far
    pub fn produced(&self) -> u64 {
        self.produced
    }

    fn draw(&mut self) -> LimbAngles {
        let base = self.config.base;
        let jitter = self.config.jitter;
        LimbAngles {
            elbow: self.jittered(base.elbow, jitter.elbow),
            shoulder: self.jittered(base.shoulder, jitter.shoulder),
            hip: self.jittered(base.hip, jitter.hip),
            knee: self.jittered(base.knee, jitter.knee),
        }
    }

    fn jittered(&mut self, base: f64, spread: f64) -> f64 {
        let offset = if spread.is_finite() && spread > 0.0 {
            self.rng.gen_range(-spread..=spread)
        } else {
            0.0
        };
        (base + offset).clamp(0.0, 180.0)
    }

    /// Generate the next frame from explicit angles
    pub fn skeleton(&self, timestamp: Timestamp, left: LimbAngles, right: LimbAngles) -> LandmarkFrame {
        use Landmark::*;

        let mut frame = LandmarkFrame::empty(timestamp);
        let mut put = |landmark: Landmark, (x, y): (f64, f64)| {
            frame.set(
                landmark,
                Point::new(x, y).with_z(0.0).with_visibility(self.config.visibility),
            );
        };

        // Head
        put(Nose, (0.50, 0.18));
        put(LeftEyeInner, (0.51, 0.16));
        put(LeftEye, (0.52, 0.16));
        put(LeftEyeOuter, (0.53, 0.16));
        put(RightEyeInner, (0.49, 0.16));
        put(RightEye, (0.48, 0.16));
        put(RightEyeOuter, (0.47, 0.16));
        put(LeftEar, (0.55, 0.17));
        put(RightEar, (0.45, 0.17));
        put(MouthLeft, (0.52, 0.21));
        put(MouthRight, (0.48, 0.21));

        // The subject faces the camera: their left is image right
        let sides = [
            (1.0, left, [LeftShoulder, LeftElbow, LeftWrist, LeftHip, LeftKnee, LeftAnkle]),
            (-1.0, right, [RightShoulder, RightElbow, RightWrist, RightHip, RightKnee, RightAnkle]),
        ];
        for (side, angles, [shoulder_lm, elbow_lm, wrist_lm, hip_lm, knee_lm, ankle_lm]) in sides {
            let shoulder = (0.50 + side * 0.08, 0.30);
            let hip = (0.50 + side * 0.05, 0.55);

            let elbow = place(shoulder, hip, angles.shoulder, UPPER_ARM, -side);
            let wrist = place(elbow, shoulder, angles.elbow, FOREARM, side);
            let knee = place(hip, shoulder, angles.hip, THIGH, side);
            let ankle = place(knee, hip, angles.knee, SHIN, -side);

            put(shoulder_lm, shoulder);
            put(elbow_lm, elbow);
            put(wrist_lm, wrist);
            put(hip_lm, hip);
            put(knee_lm, knee);
            put(ankle_lm, ankle);
        }

        // Hands and feet hang off the wrist and ankle
        for (wrist_lm, pinky, index, thumb) in [
            (LeftWrist, LeftPinky, LeftIndex, LeftThumb),
            (RightWrist, RightPinky, RightIndex, RightThumb),
        ] {
            if let Some(w) = frame.landmark(wrist_lm).copied() {
                let mut put = |lm, dx: f64, dy: f64| {
                    frame.set(lm, offset(&w, dx, dy));
                };
                put(pinky, 0.010, 0.020);
                put(index, 0.000, 0.025);
                put(thumb, -0.010, 0.015);
            }
        }
        for (ankle_lm, heel, toe) in [
            (LeftAnkle, LeftHeel, LeftFootIndex),
            (RightAnkle, RightHeel, RightFootIndex),
        ] {
            if let Some(a) = frame.landmark(ankle_lm).copied() {
                frame.set(heel, offset(&a, 0.0, 0.015));
                frame.set(toe, offset(&a, 0.0, 0.035).with_z(-0.02));
            }
        }

        frame
    }

    fn apply_dropout(&mut self, frame: &mut LandmarkFrame) {
        if self.config.dropout <= 0.0 {
            return;
        }
        let p = self.config.dropout.min(1.0);
        for slot in frame.points.iter_mut() {
            if self.rng.gen_bool(p) {
                *slot = None;
            }
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> SourcePoll {
        if self.config.limit.is_some_and(|limit| self.produced >= limit) {
            return SourcePoll::Closed;
        }

        let left = self.draw();
        let right = self.draw();
        let timestamp = self.next_timestamp;
        let mut frame = self.skeleton(timestamp, left, right);
        self.apply_dropout(&mut frame);

        self.next_timestamp = timestamp + self.config.frame_interval;
        self.produced += 1;
        SourcePoll::Frame(frame)
    }

    fn describe(&self) -> &str {
        "synthetic"
    }
}

/// Point `length` away from `from`, rotated `angle` degrees off the ray
/// towards `toward`. The angle at `from` between `toward` and the result is
/// exactly `angle`.
fn place(from: (f64, f64), toward: (f64, f64), angle: f64, length: f64, sign: f64) -> (f64, f64) {
    let (dx, dy) = (toward.0 - from.0, toward.1 - from.1);
    let norm = dx.hypot(dy);
    let (ux, uy) = (dx / norm, dy / norm);
    let theta = sign * angle.to_radians();
    let (s, c) = theta.sin_cos();
    (
        from.0 + length * (ux * c - uy * s),
        from.1 + length * (ux * s + uy * c),
    )
}

fn offset(origin: &Point, dx: f64, dy: f64) -> Point {
    let mut p = *origin;
    p.x += dx;
    p.y += dy;
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiji_pose::JointTable;

    fn no_jitter() -> SyntheticConfig {
        SyntheticConfig {
            jitter: LimbAngles::zero(),
            ..Default::default()
        }
    }

    #[test]
    fn test_non_finite_jitter_is_ignored() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            jitter: LimbAngles {
                elbow: f64::INFINITY,
                shoulder: f64::NAN,
                ..LimbAngles::zero()
            },
            ..Default::default()
        });
        let frame = source.next_frame().into_frame().unwrap();
        let angles = JointTable::standard().extract(&frame);

        assert!((angles.get("left_elbow").unwrap() - 125.0).abs() < 1e-6);
        assert!((angles.get("right_shoulder").unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_skeleton_reproduces_base_pose() {
        let mut source = SyntheticSource::new(no_jitter());
        let frame = source.next_frame().into_frame().unwrap();
        let angles = JointTable::standard().extract(&frame);

        for (joint, expected) in [
            ("left_elbow", 125.0),
            ("right_elbow", 125.0),
            ("left_shoulder", 100.0),
            ("right_shoulder", 100.0),
            ("left_hip", 170.0),
            ("right_hip", 170.0),
            ("left_knee", 165.0),
            ("right_knee", 165.0),
        ] {
            let got = angles.get(joint).unwrap();
            assert!((got - expected).abs() < 1e-6, "{joint}: {got}");
        }
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let mut source = SyntheticSource::new(SyntheticConfig::default());
        let table = JointTable::standard();

        for _ in 0..200 {
            let frame = source.next_frame().into_frame().unwrap();
            let angles = table.extract(&frame);
            for side in ["left", "right"] {
                let elbow = angles.get(&format!("{side}_elbow")).unwrap();
                let knee = angles.get(&format!("{side}_knee")).unwrap();
                assert!((115.0 - 1e-6..=135.0 + 1e-6).contains(&elbow));
                assert!((157.5 - 1e-6..=172.5 + 1e-6).contains(&knee));
            }
        }
    }

    #[test]
    fn test_frames_are_complete_and_ordered() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            start: Timestamp::from_millis(500),
            ..Default::default()
        });

        let first = source.next_frame().into_frame().unwrap();
        let second = source.next_frame().into_frame().unwrap();

        assert_eq!(first.present(), taiji_core::LANDMARK_COUNT);
        assert_eq!(first.timestamp, Timestamp::from_millis(500));
        assert_eq!(second.timestamp, Timestamp::from_millis(600));
        assert_eq!(source.produced(), 2);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticSource::new(SyntheticConfig::default());
        let mut b = SyntheticSource::new(SyntheticConfig::default());
        for _ in 0..5 {
            assert_eq!(a.next_frame(), b.next_frame());
        }
    }

    #[test]
    fn test_limit_closes_source() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            limit: Some(2),
            ..Default::default()
        });
        assert!(matches!(source.next_frame(), SourcePoll::Frame(_)));
        assert!(matches!(source.next_frame(), SourcePoll::Frame(_)));
        assert_eq!(source.next_frame(), SourcePoll::Closed);
    }

    #[test]
    fn test_full_dropout_empties_frame() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            dropout: 1.0,
            ..Default::default()
        });
        let frame = source.next_frame().into_frame().unwrap();
        assert_eq!(frame.present(), 0);
        assert_eq!(JointTable::standard().extract(&frame).defined(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_explicit_angles_are_recovered(
                elbow in 30.0f64..175.0,
                shoulder in 10.0f64..170.0,
                hip in 90.0f64..179.0,
                knee in 90.0f64..179.0,
            ) {
                let source = SyntheticSource::new(SyntheticConfig::default());
                let pose = LimbAngles { elbow, shoulder, hip, knee };
                let frame = source.skeleton(Timestamp::ZERO, pose, pose);
                let angles = JointTable::standard().extract(&frame);

                for (side, expected) in [("elbow", elbow), ("shoulder", shoulder), ("hip", hip), ("knee", knee)] {
                    for prefix in ["left", "right"] {
                        let got = angles.get(&format!("{prefix}_{side}")).unwrap();
                        prop_assert!((got - expected).abs() < 1e-6);
                    }
                }
            }
        }
    }
}
