//! Session State Machine
//!
//! Drives a learner through `NotStarted -> Active -> Completed`. Every
//! transition works on a copy of the queues and only commits it to the
//! caller's state after the copy has been persisted, so a failed save never
//! loses or half-applies a learner turn.

use crate::{
    error::{CoachError, Result},
    item::LearningItem,
    queues::{Queues, TurnEffect},
    repository::LearningRepository,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// One in-flight teaching session. Only its queues are ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub queues: Queues,
}

impl Session {
    pub fn new(queues: Queues) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            start_time: Utc::now(),
            queues,
        }
    }

    /// The item currently being taught, if any remain.
    pub fn current_target(&self) -> Option<&LearningItem> {
        self.queues.current_target()
    }
}

/// Caller-owned handle describing where the learner is in the lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    NotStarted,
    Active(Session),
    Completed { session_id: Uuid },
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionState::Completed { .. })
    }
}

/// Result of a processed learner turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Items remain in the new queue; the session stays active.
    InProgress(TurnEffect),
    /// The last new item was mastered and the session has ended.
    Completed(TurnEffect),
}

impl TurnOutcome {
    pub fn effect(&self) -> &TurnEffect {
        match self {
            TurnOutcome::InProgress(effect) | TurnOutcome::Completed(effect) => effect,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }
}

/// Applies the session transitions on top of a [`LearningRepository`].
#[derive(Clone)]
pub struct SessionMachine {
    repository: Arc<dyn LearningRepository>,
}

impl SessionMachine {
    pub fn new(repository: Arc<dyn LearningRepository>) -> Self {
        Self { repository }
    }

    /// Loads the learner's queues and opens a new session.
    ///
    /// The current target is reset for its first introduction in this run and
    /// that reset is persisted before the session is handed out.
    pub async fn start_session(&self) -> Result<Session> {
        let mut queues = self.repository.load_queues().await?;
        if let Some(target) = queues.current_target_mut() {
            target.reset_progress();
        }
        self.repository.save_queues(&queues).await?;

        let session = Session::new(queues);
        info!(
            session_id = %session.session_id,
            target = session.current_target().map(|t| t.token.as_str()).unwrap_or("<none>"),
            remaining = session.queues.new_queue.len(),
            learned = session.queues.learned_pool.len(),
            "Session started"
        );
        Ok(session)
    }

    /// Applies one learner utterance to an active session.
    ///
    /// On any error the caller's state is left exactly as it was.
    pub async fn process_turn(&self, state: &mut SessionState, utterance: &str) -> Result<TurnOutcome> {
        let Some(session) = state.session_mut() else {
            return Err(CoachError::not_started());
        };

        let mut queues = session.queues.clone();
        let effect = queues.apply_turn(utterance);
        debug!(session_id = %session.session_id, ?effect, "Turn applied");

        self.repository.save_queues(&queues).await?;

        if let TurnEffect::Mastered { item, .. } = &effect {
            info!(session_id = %session.session_id, item_id = %item.id, token = %item.token, "Item mastered");
        }

        if !queues.is_exhausted() {
            session.queues = queues;
            return Ok(TurnOutcome::InProgress(effect));
        }

        let session_id = session.session_id;
        self.end_session(&queues).await?;
        info!(%session_id, "All new items mastered; session completed");
        *state = SessionState::Completed { session_id };
        Ok(TurnOutcome::Completed(effect))
    }

    /// Persists whatever queues the caller hands in.
    pub async fn end_session(&self, queues: &Queues) -> Result<()> {
        self.repository.save_queues(queues).await
    }
}
