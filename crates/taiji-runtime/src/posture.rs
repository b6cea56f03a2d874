//! Reference posture - the joint table and tolerance bands one exercise is
//! scored against
//!
//! Loaded from JSON so therapists can ship new exercises without a rebuild:
//!
//! ```json
//! {
//!   "name": "horse-stance",
//!   "min_visibility": 0.5,
//!   "projection": "planar",
//!   "joints": [
//!     { "name": "left_knee", "landmarks": ["left_hip", "left_knee", "left_ankle"] }
//!   ],
//!   "tolerances": [
//!     { "joint": "left_knee", "min": 100, "ideal": 115, "max": 130 }
//!   ]
//! }
//! ```
//!
//! `joints` may be omitted to use the standard eight-joint table. Landmarks
//! are given by name or by index.

use std::path::Path;

use serde::{Deserialize, Serialize};
use taiji_core::{Landmark, TaijiError, TaijiResult};
use taiji_pose::{JointDefinition, JointTable, Projection, ToleranceBand, ToleranceTable};
use tracing::{debug, info, warn};

pub const DEFAULT_POSTURE_NAME: &str = "tai-chi-fundamentals";

/// Joint table plus tolerance table
#[derive(Debug, Clone)]
pub struct ReferencePosture {
    pub name: String,
    pub joints: JointTable,
    pub tolerances: ToleranceTable,
}

impl Default for ReferencePosture {
    fn default() -> Self {
        Self {
            name: DEFAULT_POSTURE_NAME.to_string(),
            joints: JointTable::standard(),
            tolerances: ToleranceTable::tai_chi_fundamentals(),
        }
    }
}

impl ReferencePosture {
    pub fn new(name: impl Into<String>, joints: JointTable, tolerances: ToleranceTable) -> Self {
        let posture = Self {
            name: name.into(),
            joints,
            tolerances,
        };
        for band in posture.unmatched_bands() {
            warn!(posture = %posture.name, joint = band, "tolerance band has no matching joint");
        }
        posture
    }

    /// Parse and validate a posture document
    pub fn from_json_str(json: &str) -> TaijiResult<Self> {
        let file: PostureFile = serde_json::from_str(json)
            .map_err(|e| TaijiError::Config(format!("invalid posture document: {e}")))?;
        file.into_posture()
    }

    /// Read a posture document from disk
    pub fn load(path: impl AsRef<Path>) -> TaijiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let posture = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            posture = %posture.name,
            joints = posture.joints.len(),
            bands = posture.tolerances.len(),
            "reference posture loaded"
        );
        Ok(posture)
    }

    /// Measured joints that carry no band and are never scored
    pub fn unscored_joints(&self) -> impl Iterator<Item = &str> {
        self.joints
            .joints()
            .iter()
            .map(|j| j.name.as_str())
            .filter(|name| self.tolerances.get(name).is_none())
    }

    /// Bands naming a joint the table does not measure
    pub fn unmatched_bands(&self) -> impl Iterator<Item = &str> {
        self.tolerances
            .iter()
            .map(|(joint, _)| joint)
            .filter(|joint| !self.joints.contains(joint))
    }

    /// Serialize back to the document format
    pub fn to_json_string(&self) -> TaijiResult<String> {
        let file = PostureFile {
            name: Some(self.name.clone()),
            min_visibility: Some(self.joints.min_visibility()),
            projection: self.joints.projection().into(),
            joints: Some(
                self.joints
                    .joints()
                    .iter()
                    .map(|j| JointEntry {
                        name: j.name.clone(),
                        landmarks: j.indices().map(LandmarkRef::from_index),
                    })
                    .collect(),
            ),
            tolerances: self
                .tolerances
                .iter()
                .map(|(joint, band)| BandEntry {
                    joint: joint.to_string(),
                    min: band.min,
                    ideal: band.ideal,
                    max: band.max,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| TaijiError::Config(format!("cannot encode posture: {e}")))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostureFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_visibility: Option<f64>,
    #[serde(default)]
    projection: ProjectionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    joints: Option<Vec<JointEntry>>,
    tolerances: Vec<BandEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JointEntry {
    name: String,
    landmarks: [LandmarkRef; 3],
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LandmarkRef {
    Index(usize),
    Name(String),
}

impl LandmarkRef {
    fn from_index(index: usize) -> Self {
        match Landmark::from_index(index) {
            Some(landmark) => LandmarkRef::Name(landmark.name().to_string()),
            None => LandmarkRef::Index(index),
        }
    }

    fn resolve(&self, joint: &str) -> TaijiResult<usize> {
        match self {
            LandmarkRef::Index(index) => Ok(*index),
            LandmarkRef::Name(name) => Landmark::from_name(name)
                .map(Landmark::index)
                .ok_or_else(|| TaijiError::Config(format!("joint {joint}: unknown landmark {name:?}"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BandEntry {
    joint: String,
    min: f64,
    ideal: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProjectionName {
    #[default]
    Planar,
    Spatial,
}

impl From<ProjectionName> for Projection {
    fn from(name: ProjectionName) -> Self {
        match name {
            ProjectionName::Planar => Projection::Planar,
            ProjectionName::Spatial => Projection::Spatial,
        }
    }
}

impl From<Projection> for ProjectionName {
    fn from(projection: Projection) -> Self {
        match projection {
            Projection::Planar => ProjectionName::Planar,
            Projection::Spatial => ProjectionName::Spatial,
        }
    }
}

impl PostureFile {
    fn into_posture(self) -> TaijiResult<ReferencePosture> {
        let mut joints = match self.joints {
            Some(entries) => {
                let definitions = entries
                    .iter()
                    .map(|entry| {
                        let [a, b, c] = &entry.landmarks;
                        Ok(JointDefinition::from_indices(
                            entry.name.clone(),
                            a.resolve(&entry.name)?,
                            b.resolve(&entry.name)?,
                            c.resolve(&entry.name)?,
                        ))
                    })
                    .collect::<TaijiResult<Vec<_>>>()?;
                JointTable::new(definitions)?
            }
            None => JointTable::standard(),
        };
        if let Some(threshold) = self.min_visibility {
            joints = joints.with_min_visibility(threshold)?;
        }
        joints = joints.with_projection(self.projection.into());

        let tolerances = ToleranceTable::new(
            self.tolerances
                .into_iter()
                .map(|b| (b.joint, ToleranceBand::new(b.min, b.ideal, b.max))),
        )?;

        let name = self.name.unwrap_or_else(|| DEFAULT_POSTURE_NAME.to_string());
        let posture = ReferencePosture::new(name, joints, tolerances);
        for joint in posture.unscored_joints() {
            debug!(posture = %posture.name, joint, "joint measured but not scored");
        }
        Ok(posture)
    }
}
