//! Session aggregator
//!
//! INVARIANT: frames fold into the aggregate only while Active.
//! INVARIANT: frame_count never decreases except on reset.
//! Lifecycle events that do not apply to the current phase are ignored and
//! reported as `false`; they are never errors.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use taiji_core::{Clock, SystemClock, Timestamp};
use taiji_pose::{FrameEvaluation, Status};
use tracing::{debug, info};

use crate::{GoalProgress, SessionGoals};

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Paused,
    Stopped,
}

/// What to keep of the frames folded into the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Keep only the aggregate
    #[default]
    Discard,
    /// Keep per-frame records; with a capacity the oldest are evicted
    Retain { capacity: Option<usize> },
}

/// One folded frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    pub timestamp: Timestamp,
    pub accuracy: f64,
    pub status: Status,
}

/// Read-only snapshot of a session
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub active: bool,
    pub frame_count: u64,
    pub running_mean_accuracy: f64,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    /// Time spent Active, pauses excluded, as of the snapshot
    pub active_elapsed: Duration,
}

/// The aggregator
pub struct Session {
    phase: SessionPhase,
    frame_count: u64,
    mean_accuracy: f64,
    started_at: Option<Timestamp>,
    ended_at: Option<Timestamp>,
    /// Start of the current Active span
    active_since: Option<Timestamp>,
    /// Closed Active spans
    accumulated: Duration,
    policy: HistoryPolicy,
    history: VecDeque<FrameRecord>,
    clock: Arc<dyn Clock>,
}

impl Session {
    /// Session on the wall clock, no history
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Session {
            phase: SessionPhase::Idle,
            frame_count: 0,
            mean_accuracy: 0.0,
            started_at: None,
            ended_at: None,
            active_since: None,
            accumulated: Duration::ZERO,
            policy: HistoryPolicy::Discard,
            history: VecDeque::new(),
            clock,
        }
    }

    pub fn with_history(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Idle/Paused -> Active
    pub fn start(&mut self) -> bool {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Paused => {
                let now = self.clock.now();
                let resumed = self.phase == SessionPhase::Paused;
                self.started_at.get_or_insert(now);
                self.ended_at = None;
                self.active_since = Some(now);
                self.phase = SessionPhase::Active;
                info!(?now, resumed, frames = self.frame_count, "session active");
                true
            }
            phase => {
                debug!(?phase, "start ignored");
                false
            }
        }
    }

    /// Active -> Paused
    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Active {
            debug!(phase = ?self.phase, "pause ignored");
            return false;
        }
        let now = self.clock.now();
        self.close_active_span(now);
        self.phase = SessionPhase::Paused;
        info!(?now, frames = self.frame_count, "session paused");
        true
    }

    /// Active/Paused -> Stopped
    pub fn stop(&mut self) -> bool {
        match self.phase {
            SessionPhase::Active | SessionPhase::Paused => {
                let now = self.clock.now();
                self.close_active_span(now);
                self.ended_at = Some(now);
                self.phase = SessionPhase::Stopped;
                info!(
                    ?now,
                    frames = self.frame_count,
                    mean_accuracy = self.mean_accuracy,
                    "session stopped"
                );
                true
            }
            phase => {
                debug!(?phase, "stop ignored");
                false
            }
        }
    }

    /// Any phase -> Idle, discarding everything accumulated
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.frame_count = 0;
        self.mean_accuracy = 0.0;
        self.started_at = None;
        self.ended_at = None;
        self.active_since = None;
        self.accumulated = Duration::ZERO;
        self.history.clear();
        info!("session reset");
    }

    /// Fold one evaluation into the aggregate. Dropped unless Active.
    pub fn ingest(&mut self, evaluation: &FrameEvaluation) -> bool {
        if self.phase != SessionPhase::Active {
            debug!(phase = ?self.phase, ts = ?evaluation.timestamp, "frame not ingested");
            return false;
        }

        let accuracy = evaluation.accuracy_percent;
        self.frame_count += 1;
        self.mean_accuracy += (accuracy - self.mean_accuracy) / self.frame_count as f64;
        self.mean_accuracy = self.mean_accuracy.clamp(0.0, 100.0);

        if let HistoryPolicy::Retain { capacity } = self.policy {
            self.history.push_back(FrameRecord {
                timestamp: evaluation.timestamp,
                accuracy,
                status: evaluation.status,
            });
            if let Some(cap) = capacity {
                while self.history.len() > cap {
                    self.history.pop_front();
                }
            }
        }

        true
    }

    fn close_active_span(&mut self, now: Timestamp) {
        if let Some(since) = self.active_since.take() {
            self.accumulated += now - since;
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn running_mean_accuracy(&self) -> f64 {
        self.mean_accuracy
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    /// Time spent Active so far, including the current span
    pub fn active_elapsed(&self) -> Duration {
        match self.active_since {
            Some(since) => self.accumulated + (self.clock.now() - since),
            None => self.accumulated,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &FrameRecord> {
        self.history.iter()
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        self.policy
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            active: self.is_active(),
            frame_count: self.frame_count,
            running_mean_accuracy: self.mean_accuracy,
            started_at: self.started_at,
            ended_at: self.ended_at,
            active_elapsed: self.active_elapsed(),
        }
    }

    pub fn progress(&self, goals: &SessionGoals) -> GoalProgress {
        goals.progress(self.active_elapsed(), self.mean_accuracy)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("frame_count", &self.frame_count)
            .field("mean_accuracy", &self.mean_accuracy)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .field("history", &self.history.len())
            .finish()
    }
}
