//! Practice goals for a session

use std::time::Duration;

/// Daily targets shown next to the session controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionGoals {
    pub target_duration: Duration,
    /// Mean accuracy to aim for, percent
    pub target_accuracy: f64,
}

impl Default for SessionGoals {
    fn default() -> Self {
        SessionGoals {
            target_duration: Duration::from_secs(20 * 60),
            target_accuracy: 80.0,
        }
    }
}

/// Fractions of each goal reached, within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GoalProgress {
    pub duration: f64,
    pub accuracy: f64,
}

impl GoalProgress {
    pub fn is_complete(&self) -> bool {
        self.duration >= 1.0 && self.accuracy >= 1.0
    }
}

impl SessionGoals {
    pub fn progress(&self, elapsed: Duration, mean_accuracy: f64) -> GoalProgress {
        GoalProgress {
            duration: ratio(elapsed.as_secs_f64(), self.target_duration.as_secs_f64()),
            accuracy: ratio(mean_accuracy, self.target_accuracy),
        }
    }
}

fn ratio(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 1.0;
    }
    (value / target).clamp(0.0, 1.0)
}
