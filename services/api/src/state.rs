//! Shared Application State

use lango_core::{CoachOrchestrator, SessionState};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Created once at startup and passed to all handlers.
///
/// The service coaches a single learner, so there is exactly one session slot.
/// Handlers hold its lock for the whole request, which keeps turns ordered.
pub struct AppState {
    pub coach: Arc<CoachOrchestrator>,
    pub session: Mutex<SessionState>,
}

impl AppState {
    pub fn new(coach: Arc<CoachOrchestrator>) -> Self {
        Self {
            coach,
            session: Mutex::new(SessionState::NotStarted),
        }
    }
}
