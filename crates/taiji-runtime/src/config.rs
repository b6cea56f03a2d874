//! Runtime configuration

use std::time::Duration;

use taiji_pose::Locale;
use taiji_session::{HistoryPolicy, SessionGoals};

/// Controller configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Interval between source polls in `Controller::run`
    pub frame_interval: Duration,
    /// Language of verdict messages
    pub locale: Locale,
    /// What the session keeps of ingested frames
    pub history: HistoryPolicy,
    pub goals: SessionGoals,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            frame_interval: Duration::from_millis(100),
            locale: Locale::English,
            history: HistoryPolicy::Discard,
            goals: SessionGoals::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_history(mut self, history: HistoryPolicy) -> Self {
        self.history = history;
        self
    }

    pub fn with_goals(mut self, goals: SessionGoals) -> Self {
        self.goals = goals;
        self
    }
}
