//! Posture evaluation - one angle map against the reference posture
//!
//! A joint without a measured angle gives no verdict. It counts neither for
//! nor against the frame: missing data is not bad posture.

use taiji_core::Timestamp;

use crate::{AngleMap, Direction, Locale, ToleranceTable};

/// Accuracy at or above this is `Good`
pub const GOOD_THRESHOLD: f64 = 80.0;
/// Accuracy at or above this (and below `GOOD_THRESHOLD`) is `Warning`
pub const WARNING_THRESHOLD: f64 = 60.0;

/// Overall frame status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// No joint could be evaluated
    #[default]
    Waiting,
    Good,
    Warning,
    Error,
}

impl Status {
    pub fn from_accuracy(accuracy: f64, evaluable: usize) -> Status {
        if evaluable == 0 {
            Status::Waiting
        } else if accuracy >= GOOD_THRESHOLD {
            Status::Good
        } else if accuracy >= WARNING_THRESHOLD {
            Status::Warning
        } else {
            Status::Error
        }
    }
}

/// Outcome for one measured joint
#[derive(Debug, Clone, PartialEq)]
pub struct JointVerdict {
    pub joint: String,
    pub angle: f64,
    pub in_range: bool,
    pub direction: Direction,
    pub message: String,
}

/// Outcome for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEvaluation {
    pub timestamp: Timestamp,
    pub verdicts: Vec<JointVerdict>,
    /// Percentage of evaluated joints in range, within [0, 100]
    pub accuracy_percent: f64,
    pub status: Status,
}

impl FrameEvaluation {
    /// Evaluation of a frame where nothing could be measured
    pub fn waiting(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            verdicts: Vec::new(),
            accuracy_percent: 0.0,
            status: Status::Waiting,
        }
    }

    pub fn verdict(&self, joint: &str) -> Option<&JointVerdict> {
        self.verdicts.iter().find(|v| v.joint == joint)
    }

    /// Number of joints that took part in the score
    pub fn evaluated(&self) -> usize {
        self.verdicts.len()
    }

    pub fn in_range(&self) -> usize {
        self.verdicts.iter().filter(|v| v.in_range).count()
    }
}

/// Evaluate with English feedback
pub fn evaluate(angles: &AngleMap, tolerances: &ToleranceTable) -> FrameEvaluation {
    evaluate_localized(angles, tolerances, Locale::English)
}

pub fn evaluate_localized(
    angles: &AngleMap,
    tolerances: &ToleranceTable,
    locale: Locale,
) -> FrameEvaluation {
    let verdicts: Vec<JointVerdict> = angles
        .iter()
        .filter_map(|entry| {
            let angle = entry.degrees.filter(|a| a.is_finite())?;
            let band = tolerances.get(&entry.name)?;
            let direction = band.classify(angle);
            Some(JointVerdict {
                joint: entry.name.clone(),
                angle,
                in_range: direction == Direction::Ok,
                direction,
                message: locale.verdict_message(&entry.name, angle, band, direction),
            })
        })
        .collect();

    let evaluated = verdicts.len();
    if evaluated == 0 {
        return FrameEvaluation::waiting(angles.timestamp);
    }

    let in_range = verdicts.iter().filter(|v| v.in_range).count();
    let accuracy_percent = 100.0 * in_range as f64 / evaluated as f64;

    FrameEvaluation {
        timestamp: angles.timestamp,
        verdicts,
        accuracy_percent,
        status: Status::from_accuracy(accuracy_percent, evaluated),
    }
}
