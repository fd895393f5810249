//! Coach Orchestrator
//!
//! The façade a presentation layer talks to. It combines the session state
//! machine, the prompt builder and the dialogue generator into the session
//! lifecycle. The session itself is owned by the caller as a [`SessionState`]
//! and passed in on every call.

use crate::{
    dialogue::DialogueService,
    error::{CoachError, Result},
    prompt::{COMPLETION_MESSAGE, DialoguePrompt, PromptBuilder, TemplateSource},
    queues::Queues,
    repository::LearningRepository,
    session::{Session, SessionMachine, SessionState, TurnOutcome},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which kind of line the coach produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Introduction,
    Reinforcement,
    Completion,
}

/// The coach's next line, ready to be shown or spoken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachReply {
    pub kind: ReplyKind,
    pub text: String,
}

impl CoachReply {
    fn completion() -> Self {
        Self {
            kind: ReplyKind::Completion,
            text: COMPLETION_MESSAGE.to_string(),
        }
    }
}

pub struct CoachOrchestrator {
    machine: SessionMachine,
    prompts: PromptBuilder,
    dialogue: Arc<dyn DialogueService>,
}

impl CoachOrchestrator {
    pub fn new(
        repository: Arc<dyn LearningRepository>,
        templates: Arc<dyn TemplateSource>,
        dialogue: Arc<dyn DialogueService>,
    ) -> Self {
        Self {
            machine: SessionMachine::new(repository),
            prompts: PromptBuilder::new(templates),
            dialogue,
        }
    }

    pub async fn start_session(&self) -> Result<Session> {
        self.machine.start_session().await
    }

    pub async fn process_turn(&self, state: &mut SessionState, utterance: &str) -> Result<TurnOutcome> {
        self.machine.process_turn(state, utterance).await
    }

    pub async fn end_session(&self, queues: &Queues) -> Result<()> {
        self.machine.end_session(queues).await
    }

    /// Produces the coach's next line for the session.
    ///
    /// Introducing a target counts as presenting it, but only once the
    /// generator has answered; a failed call leaves the target unintroduced.
    pub async fn coach_dialogue(&self, state: &mut SessionState) -> Result<CoachReply> {
        let session = match state {
            SessionState::NotStarted => return Err(CoachError::not_started()),
            SessionState::Completed { .. } => return Ok(CoachReply::completion()),
            SessionState::Active(session) => session,
        };

        let prompt = self.prompts.build(session.session_id, &session.queues).await?;
        let kind = match &prompt {
            DialoguePrompt::Completed => return Ok(CoachReply::completion()),
            DialoguePrompt::Introduction(_) => ReplyKind::Introduction,
            DialoguePrompt::Reinforcement(_) => ReplyKind::Reinforcement,
        };
        let Some(wire) = prompt.to_wire()? else {
            return Ok(CoachReply::completion());
        };
        debug!(session_id = %session.session_id, ?kind, "Requesting coach dialogue");

        let text = self
            .dialogue
            .generate_dialogue(&wire)
            .await
            .map_err(|e| {
                warn!(session_id = %session.session_id, error = %e, "Dialogue generation failed");
                CoachError::Upstream(e)
            })?;

        if kind == ReplyKind::Introduction {
            if let Some(target) = session.queues.current_target_mut() {
                target.presentation_count += 1;
                info!(session_id = %session.session_id, item_id = %target.id, "Target introduced");
            }
        }

        Ok(CoachReply { kind, text })
    }
}
