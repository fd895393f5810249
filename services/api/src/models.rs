//! API Models
//!
//! Request and response bodies of the coaching API, documented with `utoipa`.

use chrono::{DateTime, Utc};
use lango_core::{CoachReply, ItemPhase, LearningItem, ReplyKind, Session, SessionState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ItemView {
    #[schema(example = "german_CP001")]
    pub id: String,
    #[schema(example = "Entschuldigung")]
    pub token: String,
    pub presentation_count: u32,
    pub usage_count: u32,
    #[schema(value_type = String, example = "reinforcing")]
    pub phase: ItemPhase,
}

impl From<&LearningItem> for ItemView {
    fn from(item: &LearningItem) -> Self {
        Self {
            id: item.id.clone(),
            token: item.token.clone(),
            presentation_count: item.presentation_count,
            usage_count: item.usage_count,
            phase: item.phase(),
        }
    }
}

/// Snapshot of the learner's session. Queue details are only present while it is active.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    #[schema(value_type = String, example = "active")]
    pub status: SessionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub current_target: Option<ItemView>,
    pub remaining: usize,
    pub learned_pool: Vec<ItemView>,
}

impl SessionView {
    pub fn active(session: &Session) -> Self {
        Self {
            session_id: session.session_id,
            status: SessionStatus::Active,
            start_time: Some(session.start_time),
            current_target: session.current_target().map(ItemView::from),
            remaining: session.queues.new_queue.len(),
            learned_pool: session.queues.learned_pool.iter().map(ItemView::from).collect(),
        }
    }

    /// `None` when no session has been started.
    pub fn from_state(state: &SessionState) -> Option<Self> {
        match state {
            SessionState::NotStarted => None,
            SessionState::Active(session) => Some(Self::active(session)),
            SessionState::Completed { session_id } => Some(Self::completed(*session_id)),
        }
    }

    pub fn completed(session_id: Uuid) -> Self {
        Self {
            session_id,
            status: SessionStatus::Completed,
            start_time: None,
            current_target: None,
            remaining: 0,
            learned_pool: Vec::new(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CoachLine {
    #[schema(value_type = String, example = "introduction")]
    pub kind: ReplyKind,
    #[schema(example = "Entschuldigung! Entschuldigung, wo ist der Bahnhof?")]
    pub text: String,
}

impl From<CoachReply> for CoachLine {
    fn from(reply: CoachReply) -> Self {
        Self {
            kind: reply.kind,
            text: reply.text,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct StartSessionResponse {
    pub session: SessionView,
    pub dialogue: CoachLine,
}

#[derive(Deserialize, ToSchema)]
pub struct TurnPayload {
    #[schema(example = "Entschuldigung, ich verstehe nicht.")]
    pub text: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TurnResponse {
    #[schema(value_type = String, example = "active")]
    pub status: SessionStatus,
    /// Set when this turn mastered the target.
    pub mastered: Option<ItemView>,
    pub session: SessionView,
    pub dialogue: CoachLine,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
