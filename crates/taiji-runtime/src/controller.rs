//! Frame loop controller
//!
//! Pull-based: one frame is in flight at a time, and a slow stage delays the
//! next pull instead of queueing frames.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use taiji_core::{Clock, SystemClock, Timestamp};
use taiji_pose::{evaluate_localized, FrameEvaluation};
use taiji_session::{GoalProgress, Session, SessionHandle, SessionState};
use taiji_source::{FrameSource, SourcePoll};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{ReferencePosture, RuntimeConfig};

/// What one evaluated frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub evaluation: FrameEvaluation,
    /// Session snapshot taken after the frame was folded in
    pub session: SessionState,
}

/// Result of a single `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Evaluated,
    /// Frame arrived with a timestamp older than the last accepted one
    OutOfOrder,
    Pending,
    Closed,
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub steps: u64,
    pub frames_pulled: u64,
    pub frames_evaluated: u64,
    pub frames_ingested: u64,
    pub out_of_order: u64,
    pub pending_polls: u64,
    pub last_step_duration: Duration,
}

/// Drives a source through extraction, evaluation and the session
pub struct Controller<S> {
    source: S,
    posture: ReferencePosture,
    config: RuntimeConfig,
    session: SessionHandle,
    last_timestamp: Option<Timestamp>,
    last_evaluation: Option<FrameEvaluation>,
    reports: watch::Sender<Option<FrameReport>>,
    stats: RuntimeStats,
}

impl<S: FrameSource> Controller<S> {
    /// Controller with a fresh session on the wall clock
    pub fn new(source: S, posture: ReferencePosture, config: RuntimeConfig) -> Self {
        Self::with_clock(source, posture, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: S,
        posture: ReferencePosture,
        config: RuntimeConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = Session::with_clock(clock).with_history(config.history);
        Self::with_session(source, posture, config, SessionHandle::new(session))
    }

    /// Controller that feeds an existing session
    pub fn with_session(
        source: S,
        posture: ReferencePosture,
        config: RuntimeConfig,
        session: SessionHandle,
    ) -> Self {
        let (reports, _) = watch::channel(None);
        Controller {
            source,
            posture,
            config,
            session,
            last_timestamp: None,
            last_evaluation: None,
            reports,
            stats: RuntimeStats::default(),
        }
    }

    /// Handle for lifecycle calls and snapshots from other tasks
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn posture(&self) -> &ReferencePosture {
        &self.posture
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Most recent evaluation; stays readable while paused or stopped
    pub fn last_evaluation(&self) -> Option<&FrameEvaluation> {
        self.last_evaluation.as_ref()
    }

    /// Progress towards the configured goals
    pub fn progress(&self) -> GoalProgress {
        self.session.progress(&self.config.goals)
    }

    /// Receiver of the latest report; `None` until the first frame
    pub fn subscribe(&self) -> watch::Receiver<Option<FrameReport>> {
        self.reports.subscribe()
    }

    /// Process at most one frame
    pub fn step(&mut self) -> StepOutcome {
        let start = Instant::now();
        self.stats.steps += 1;

        // Stage 1: Pull
        let frame = match self.source.next_frame() {
            SourcePoll::Frame(frame) => frame,
            SourcePoll::Pending => {
                self.stats.pending_polls += 1;
                return StepOutcome::Pending;
            }
            SourcePoll::Closed => return StepOutcome::Closed,
        };
        self.stats.frames_pulled += 1;

        // Stage 2: Order check
        if let Some(last) = self.last_timestamp {
            if frame.timestamp < last {
                self.stats.out_of_order += 1;
                warn!(
                    timestamp = frame.timestamp.as_millis(),
                    last = last.as_millis(),
                    "dropping out-of-order frame"
                );
                return StepOutcome::OutOfOrder;
            }
        }
        self.last_timestamp = Some(frame.timestamp);

        // Stage 3: Extract
        let angles = self.posture.joints.extract(&frame);

        // Stage 4: Evaluate
        let evaluation = evaluate_localized(&angles, &self.posture.tolerances, self.config.locale);
        self.stats.frames_evaluated += 1;

        // Stage 5: Aggregate (ignored unless Active)
        if self.session.ingest(&evaluation) {
            self.stats.frames_ingested += 1;
        }

        // Stage 6: Publish
        debug!(
            timestamp = evaluation.timestamp.as_millis(),
            accuracy = evaluation.accuracy_percent,
            status = ?evaluation.status,
            "frame evaluated"
        );
        self.reports.send_replace(Some(FrameReport {
            evaluation: evaluation.clone(),
            session: self.session.state(),
        }));
        self.last_evaluation = Some(evaluation);

        self.stats.last_step_duration = start.elapsed();
        StepOutcome::Evaluated
    }

    /// Step until the source has nothing ready or is closed
    pub fn drain(&mut self) -> StepOutcome {
        loop {
            match self.step() {
                StepOutcome::Evaluated | StepOutcome::OutOfOrder => continue,
                outcome => return outcome,
            }
        }
    }

    /// Poll the source every `frame_interval` until it closes or `shutdown`
    /// resolves
    pub async fn run<F>(&mut self, shutdown: F) -> RuntimeStats
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            source = self.source.describe(),
            posture = %self.posture.name,
            interval_ms = self.config.frame_interval.as_millis() as u64,
            "frame loop started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("frame loop shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    if self.step() == StepOutcome::Closed {
                        info!(source = self.source.describe(), "source closed");
                        break;
                    }
                }
            }
        }

        info!(
            evaluated = self.stats.frames_evaluated,
            ingested = self.stats.frames_ingested,
            out_of_order = self.stats.out_of_order,
            "frame loop stopped"
        );
        self.stats.clone()
    }
}
