//! Landmark data - what the pose model hands us for one observation instant
//!
//! The pipeline trusts these coordinates as given. A slot may be empty when
//! the model did not report that point.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Number of landmarks in the body layout
pub const LANDMARK_COUNT: usize = 33;

/// Body landmark index (BlazePose 33-point layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Landmark {
    // Face
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,

    // Upper body
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,

    // Lower body
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Landmark {
    /// All landmarks in index order
    pub fn all() -> &'static [Landmark] {
        use Landmark::*;
        &[
            Nose,
            LeftEyeInner,
            LeftEye,
            LeftEyeOuter,
            RightEyeInner,
            RightEye,
            RightEyeOuter,
            LeftEar,
            RightEar,
            MouthLeft,
            MouthRight,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftPinky,
            RightPinky,
            LeftIndex,
            RightIndex,
            LeftThumb,
            RightThumb,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
            LeftHeel,
            RightHeel,
            LeftFootIndex,
            RightFootIndex,
        ]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Landmark> {
        Self::all().get(index).copied()
    }

    /// Lookup by snake_case name, e.g. `"left_elbow"`
    pub fn from_name(name: &str) -> Option<Landmark> {
        Self::all().iter().copied().find(|l| l.name() == name)
    }

    pub fn name(self) -> &'static str {
        use Landmark::*;
        match self {
            Nose => "nose",
            LeftEyeInner => "left_eye_inner",
            LeftEye => "left_eye",
            LeftEyeOuter => "left_eye_outer",
            RightEyeInner => "right_eye_inner",
            RightEye => "right_eye",
            RightEyeOuter => "right_eye_outer",
            LeftEar => "left_ear",
            RightEar => "right_ear",
            MouthLeft => "mouth_left",
            MouthRight => "mouth_right",
            LeftShoulder => "left_shoulder",
            RightShoulder => "right_shoulder",
            LeftElbow => "left_elbow",
            RightElbow => "right_elbow",
            LeftWrist => "left_wrist",
            RightWrist => "right_wrist",
            LeftPinky => "left_pinky",
            RightPinky => "right_pinky",
            LeftIndex => "left_index",
            RightIndex => "right_index",
            LeftThumb => "left_thumb",
            RightThumb => "right_thumb",
            LeftHip => "left_hip",
            RightHip => "right_hip",
            LeftKnee => "left_knee",
            RightKnee => "right_knee",
            LeftAnkle => "left_ankle",
            RightAnkle => "right_ankle",
            LeftHeel => "left_heel",
            RightHeel => "right_heel",
            LeftFootIndex => "left_foot_index",
            RightFootIndex => "right_foot_index",
        }
    }
}

/// A tracked point. `z` and `visibility` are optional because 2-D models
/// report neither.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Whether the model is at least `threshold` confident in this point.
    /// Points without a visibility score are taken at face value.
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility.map_or(true, |v| v >= threshold)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// One observation instant: landmark slots in layout order plus capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp: Timestamp,
    pub points: Vec<Option<Point>>,
}

impl LandmarkFrame {
    pub fn new(timestamp: Timestamp, points: Vec<Option<Point>>) -> Self {
        Self { timestamp, points }
    }

    /// A frame with every slot empty
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            points: vec![None; LANDMARK_COUNT],
        }
    }

    /// Point at a raw index; `None` if out of range or not reported
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index).and_then(Option::as_ref)
    }

    pub fn landmark(&self, landmark: Landmark) -> Option<&Point> {
        self.get(landmark.index())
    }

    pub fn set(&mut self, landmark: Landmark, point: Point) {
        let idx = landmark.index();
        if idx < self.points.len() {
            self.points[idx] = Some(point);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of slots that carry a point
    pub fn present(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}
