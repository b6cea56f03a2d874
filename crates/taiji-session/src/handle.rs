//! Shared session handle
//!
//! Every lifecycle call and every ingest is a read-modify-write on the same
//! state, so they all go through one mutex. Readers take snapshots.

use std::sync::Arc;

use parking_lot::Mutex;
use taiji_pose::FrameEvaluation;

use crate::{GoalProgress, Session, SessionGoals, SessionState};

/// Cloneable handle to one session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn start(&self) -> bool {
        self.inner.lock().start()
    }

    pub fn pause(&self) -> bool {
        self.inner.lock().pause()
    }

    pub fn stop(&self) -> bool {
        self.inner.lock().stop()
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    pub fn ingest(&self, evaluation: &FrameEvaluation) -> bool {
        self.inner.lock().ingest(evaluation)
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    pub fn progress(&self, goals: &SessionGoals) -> GoalProgress {
        self.inner.lock().progress(goals)
    }

    /// Run `f` with the session locked
    pub fn with<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.inner.lock())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new(Session::new())
    }
}

impl From<Session> for SessionHandle {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
