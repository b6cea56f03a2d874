//! Joint table - which landmark triples are measured, and how
//!
//! A table is validated once when it is built. Extraction against a valid
//! table never fails: joints that cannot be measured on a given frame come
//! back as undefined angles, never dropped.

use std::collections::HashSet;

use taiji_core::{Landmark, LandmarkFrame, TaijiError, TaijiResult, Timestamp, LANDMARK_COUNT};
use tracing::debug;

use crate::{joint_angle, Projection};

/// Default confidence below which a landmark counts as missing
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.3;

/// A named landmark triple; the angle is measured at `vertex`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointDefinition {
    pub name: String,
    pub proximal: usize,
    pub vertex: usize,
    pub distal: usize,
}

impl JointDefinition {
    pub fn new(name: impl Into<String>, proximal: Landmark, vertex: Landmark, distal: Landmark) -> Self {
        Self::from_indices(name, proximal.index(), vertex.index(), distal.index())
    }

    pub fn from_indices(name: impl Into<String>, proximal: usize, vertex: usize, distal: usize) -> Self {
        Self {
            name: name.into(),
            proximal,
            vertex,
            distal,
        }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.proximal, self.vertex, self.distal]
    }

    fn validate(&self, landmark_count: usize) -> TaijiResult<()> {
        let indices = self.indices();
        for &index in &indices {
            if index >= landmark_count {
                return Err(TaijiError::LandmarkOutOfRange {
                    joint: self.name.clone(),
                    index,
                    count: landmark_count,
                });
            }
        }
        if indices[0] == indices[1] || indices[0] == indices[2] {
            return Err(TaijiError::RepeatedLandmark {
                joint: self.name.clone(),
                index: indices[0],
            });
        }
        if indices[1] == indices[2] {
            return Err(TaijiError::RepeatedLandmark {
                joint: self.name.clone(),
                index: indices[1],
            });
        }
        Ok(())
    }
}

/// The elbows, shoulders, hips and knees of the 33-point layout
pub fn standard_joints() -> Vec<JointDefinition> {
    use Landmark::*;
    vec![
        JointDefinition::new("left_elbow", LeftShoulder, LeftElbow, LeftWrist),
        JointDefinition::new("right_elbow", RightShoulder, RightElbow, RightWrist),
        JointDefinition::new("left_shoulder", LeftHip, LeftShoulder, LeftElbow),
        JointDefinition::new("right_shoulder", RightHip, RightShoulder, RightElbow),
        JointDefinition::new("left_hip", LeftShoulder, LeftHip, LeftKnee),
        JointDefinition::new("right_hip", RightShoulder, RightHip, RightKnee),
        JointDefinition::new("left_knee", LeftHip, LeftKnee, LeftAnkle),
        JointDefinition::new("right_knee", RightHip, RightKnee, RightAnkle),
    ]
}

/// Validated, ordered set of joints plus the extraction policy
#[derive(Debug, Clone)]
pub struct JointTable {
    joints: Vec<JointDefinition>,
    landmark_count: usize,
    min_visibility: f64,
    projection: Projection,
}

impl JointTable {
    /// Build a table for the 33-point layout
    pub fn new(joints: Vec<JointDefinition>) -> TaijiResult<Self> {
        Self::with_landmark_count(joints, LANDMARK_COUNT)
    }

    /// Build a table for a layout with `landmark_count` points
    pub fn with_landmark_count(joints: Vec<JointDefinition>, landmark_count: usize) -> TaijiResult<Self> {
        let mut seen = HashSet::new();
        for joint in &joints {
            joint.validate(landmark_count)?;
            if !seen.insert(joint.name.as_str()) {
                return Err(TaijiError::DuplicateJoint(joint.name.clone()));
            }
        }

        debug!(joints = joints.len(), landmark_count, "joint table built");

        Ok(Self {
            joints,
            landmark_count,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            projection: Projection::Planar,
        })
    }

    /// The standard table; its definitions are fixed and known valid
    pub fn standard() -> Self {
        Self {
            joints: standard_joints(),
            landmark_count: LANDMARK_COUNT,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            projection: Projection::Planar,
        }
    }

    /// Set the confidence threshold (must be within [0, 1])
    pub fn with_min_visibility(mut self, min_visibility: f64) -> TaijiResult<Self> {
        if !(0.0..=1.0).contains(&min_visibility) {
            return Err(TaijiError::InvalidVisibility(min_visibility));
        }
        self.min_visibility = min_visibility;
        Ok(self)
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn joints(&self) -> &[JointDefinition] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    pub fn min_visibility(&self) -> f64 {
        self.min_visibility
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn contains(&self, name: &str) -> bool {
        self.joints.iter().any(|j| j.name == name)
    }

    /// Measure every joint on one frame
    pub fn extract(&self, frame: &LandmarkFrame) -> AngleMap {
        let lookup = |index: usize| {
            frame
                .get(index)
                .filter(|p| p.is_visible(self.min_visibility))
        };

        let entries = self
            .joints
            .iter()
            .map(|joint| JointAngle {
                name: joint.name.clone(),
                degrees: joint_angle(
                    lookup(joint.proximal),
                    lookup(joint.vertex),
                    lookup(joint.distal),
                    self.projection,
                ),
            })
            .collect();

        AngleMap {
            timestamp: frame.timestamp,
            entries,
        }
    }
}

impl Default for JointTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Measure every joint of `table` on `frame`
pub fn extract_angles(frame: &LandmarkFrame, table: &JointTable) -> AngleMap {
    table.extract(frame)
}

/// One joint's measurement; `None` when it could not be measured
#[derive(Debug, Clone, PartialEq)]
pub struct JointAngle {
    pub name: String,
    pub degrees: Option<f64>,
}

/// Joint name -> angle for one frame, in table order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AngleMap {
    pub timestamp: Timestamp,
    entries: Vec<JointAngle>,
}

impl AngleMap {
    /// Build a map directly, e.g. from angles a model reports itself.
    ///
    /// Non-finite angles are stored as unmeasured. A repeated joint name keeps
    /// its first entry.
    pub fn from_angles<N, I>(timestamp: Timestamp, angles: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Option<f64>)>,
    {
        let mut entries: Vec<JointAngle> = Vec::new();
        for (name, degrees) in angles {
            let name = name.into();
            if entries.iter().any(|e| e.name == name) {
                debug!(joint = %name, "ignoring repeated joint angle");
                continue;
            }
            entries.push(JointAngle {
                name,
                degrees: degrees.filter(|d| d.is_finite()),
            });
        }
        Self { timestamp, entries }
    }

    /// Whether the joint appears at all (measured or not)
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// The joint's angle, if it appears and was measured
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.degrees)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointAngle> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of joints with a measured angle
    pub fn defined(&self) -> usize {
        self.entries.iter().filter(|e| e.degrees.is_some()).count()
    }
}
