//! Feedback text shown next to each verdict

use std::borrow::Cow;

use crate::{Direction, Status, ToleranceBand};

/// Display language for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Japanese,
}

impl Locale {
    /// Human label for a joint; unknown joints fall back to their table name
    pub fn joint_label<'a>(&self, joint: &'a str) -> Cow<'a, str> {
        let label = match (self, joint) {
            (Locale::English, "left_elbow") => "Left elbow",
            (Locale::English, "right_elbow") => "Right elbow",
            (Locale::English, "left_knee") => "Left knee",
            (Locale::English, "right_knee") => "Right knee",
            (Locale::English, "left_shoulder") => "Left shoulder",
            (Locale::English, "right_shoulder") => "Right shoulder",
            (Locale::English, "left_hip") => "Left hip",
            (Locale::English, "right_hip") => "Right hip",
            (Locale::Japanese, "left_elbow") => "左肘",
            (Locale::Japanese, "right_elbow") => "右肘",
            (Locale::Japanese, "left_knee") => "左膝",
            (Locale::Japanese, "right_knee") => "右膝",
            (Locale::Japanese, "left_shoulder") => "左肩",
            (Locale::Japanese, "right_shoulder") => "右肩",
            (Locale::Japanese, "left_hip") => "左股関節",
            (Locale::Japanese, "right_hip") => "右股関節",
            _ => return Cow::Borrowed(joint),
        };
        Cow::Borrowed(label)
    }

    /// Message for one joint verdict. Out-of-range messages carry the band.
    pub fn verdict_message(
        &self,
        joint: &str,
        angle: f64,
        band: &ToleranceBand,
        direction: Direction,
    ) -> String {
        let label = self.joint_label(joint);
        match (self, direction) {
            (Locale::English, Direction::Ok) => {
                format!("{label} angle is good ({angle:.1}°)")
            }
            (Locale::English, Direction::TooExtended) => format!(
                "{label} needs more flexion (current: {angle:.1}°, target: {}-{}°)",
                band.min, band.max
            ),
            (Locale::English, Direction::TooFlexed) => format!(
                "{label} needs more extension (current: {angle:.1}°, target: {}-{}°)",
                band.min, band.max
            ),
            (Locale::Japanese, Direction::Ok) => {
                format!("{label}の角度が適切です ({angle:.1}°)")
            }
            (Locale::Japanese, Direction::TooExtended) => format!(
                "{label}をもう少し曲げてください (現在: {angle:.1}°, 目標: {}-{}°)",
                band.min, band.max
            ),
            (Locale::Japanese, Direction::TooFlexed) => format!(
                "{label}をもう少し伸ばしてください (現在: {angle:.1}°, 目標: {}-{}°)",
                band.min, band.max
            ),
        }
    }

    /// One-line summary of the frame status
    pub fn status_headline(&self, status: Status) -> &'static str {
        match (self, status) {
            (Locale::English, Status::Good) => "Great posture!",
            (Locale::English, Status::Warning) => "Adjust your posture",
            (Locale::English, Status::Error) => "Posture needs improvement",
            (Locale::English, Status::Waiting) => "Detecting posture...",
            (Locale::Japanese, Status::Good) => "素晴らしい姿勢です！",
            (Locale::Japanese, Status::Warning) => "姿勢を調整してください",
            (Locale::Japanese, Status::Error) => "姿勢の改善が必要です",
            (Locale::Japanese, Status::Waiting) => "姿勢を検出中...",
        }
    }
}
