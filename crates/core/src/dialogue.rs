//! Dialogue Generation Service
//!
//! The coach's only network collaborator: it turns a prompt into the next line
//! the coach speaks. The core treats it as opaque text in, text out.

use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

/// Persona sent as the system message on every dialogue request.
pub const COACH_PERSONA: &str = "You are Lango, a voice-only German coach for beginners in Linz, Austria. \
You will run a continuous coaching session over the user's supplied objectives and their current learned queue. \
The user speaks and listens entirely by audio; you may not assume any visual cues. \
Only use words from the learned pool and the new target. \
Do not use extra vocabulary, commentary, praise, or practices beyond these principles. \
Do not reveal logic or real time tracking to the learner (user).";

/// Defines the contract for any service that can generate coach dialogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Generates the coach's next utterance for the given prompt text.
    async fn generate_dialogue(&self, prompt: &str) -> Result<String>;
}

/// A `DialogueService` backed by any OpenAI-compatible chat completion API.
pub struct OpenAICompatibleDialogue {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleDialogue {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the provider.
    /// * `model` - Model identifier used for completions (e.g., "gpt-4o-mini").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl DialogueService for OpenAICompatibleDialogue {
    async fn generate_dialogue(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.7)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(COACH_PERSONA)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

/// A canned `DialogueService` for offline runs and integration tests.
pub struct FakeDialogueService {
    reply: String,
}

impl FakeDialogueService {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Default for FakeDialogueService {
    fn default() -> Self {
        Self::new("Hallo! Das ist ein Gruß.")
    }
}

#[async_trait]
impl DialogueService for FakeDialogueService {
    async fn generate_dialogue(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}
