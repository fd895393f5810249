//! Prompt Construction
//!
//! Decides which of two prompt shapes a turn needs and serializes the session
//! context for the dialogue generator:
//!
//! - an **introduction** prompt, a JSON envelope with a structured header and
//!   templated instruction lines, used the first time a target is presented;
//! - a **reinforcement** prompt, plain free text steering natural dialogue
//!   toward eliciting the target from the learner.

use crate::{
    error::{CoachError, Result},
    item::{ItemPhase, LearningItem},
    queues::Queues,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Separator advertised to the generator in the introduction header.
pub const DELIMITER: &str = "\u{2014}";

/// Shown directly to the learner once the new queue is empty.
pub const COMPLETION_MESSAGE: &str = "Congratulations! You've completed your learning objectives.";

/// Template file holding the `SYSTEM` and `DIALOGUE` sections.
pub const PROMPT_TEMPLATE_FILE: &str = "PROMPT.md";

const TARGET_PLACEHOLDER: &str = "{target}";
const LEARNED_POOL_PLACEHOLDER: &str = "{learned_pool}";

/// An item as it appears in the introduction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderItem {
    pub id: String,
    pub token: String,
    pub presentation_count: u32,
    pub usage_count: u32,
}

impl From<&LearningItem> for HeaderItem {
    fn from(item: &LearningItem) -> Self {
        Self {
            id: item.id.clone(),
            token: item.token.clone(),
            presentation_count: item.presentation_count,
            usage_count: item.usage_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptHeader {
    pub session_id: String,
    pub new_target: HeaderItem,
    pub learned_pool: Vec<HeaderItem>,
    pub delimiter: String,
}

/// The structured introduction prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub header: PromptHeader,
    pub body: Vec<String>,
}

/// The prompt shape chosen for the current turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialoguePrompt {
    Introduction(Prompt),
    Reinforcement(String),
    /// Nothing left to teach; the completion message is shown without an upstream call.
    Completed,
}

impl DialoguePrompt {
    /// Renders the text sent to the dialogue generator, if any.
    pub fn to_wire(&self) -> Result<Option<String>> {
        match self {
            DialoguePrompt::Introduction(prompt) => serde_json::to_string_pretty(prompt)
                .map(Some)
                .map_err(|e| CoachError::serialization("introduction prompt", e)),
            DialoguePrompt::Reinforcement(text) => Ok(Some(text.clone())),
            DialoguePrompt::Completed => Ok(None),
        }
    }
}

/// The `SYSTEM` and `DIALOGUE` sections of the prompt template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system: String,
    pub dialogue: String,
}

impl PromptTemplates {
    /// Splits a markdown document into sections keyed by `## NAME` headers.
    ///
    /// Section names are uppercase ASCII; text before the first header is dropped.
    pub fn parse_sections(markdown: &str) -> HashMap<String, String> {
        let mut sections = HashMap::new();
        let mut current: Option<String> = None;
        let mut content = String::new();

        for line in markdown.lines() {
            if let Some(name) = section_name(line) {
                if let Some(prev) = current.take() {
                    sections.insert(prev, content.trim().to_string());
                }
                content.clear();
                current = Some(name.to_string());
            } else {
                content.push_str(line);
                content.push('\n');
            }
        }
        if let Some(prev) = current {
            sections.insert(prev, content.trim().to_string());
        }
        sections
    }

    pub fn from_sections(sections: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            sections
                .get(key)
                .cloned()
                .ok_or_else(|| CoachError::Template(format!("{key} section not found")))
        };
        Ok(Self {
            system: get("SYSTEM")?,
            dialogue: get("DIALOGUE")?,
        })
    }

    /// Instruction lines for introducing `target`.
    pub fn introduction_body(&self, target: &LearningItem, learned_pool: &[LearningItem]) -> Vec<String> {
        let dialogue = self
            .dialogue
            .replace(TARGET_PLACEHOLDER, &target.token)
            .replace(LEARNED_POOL_PLACEHOLDER, &pool_tokens(learned_pool));

        non_empty_lines(&self.system)
            .chain(non_empty_lines(&dialogue))
            .collect()
    }
}

fn section_name(line: &str) -> Option<&str> {
    let name = line.trim_end().strip_prefix("##")?.trim();
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase());
    valid.then_some(name)
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

fn pool_tokens(learned_pool: &[LearningItem]) -> String {
    if learned_pool.is_empty() {
        "nothing yet".to_string()
    } else {
        learned_pool
            .iter()
            .map(|item| item.token.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Supplies raw prompt template files by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Returns the sections of the named template file.
    async fn load(&self, name: &str) -> anyhow::Result<HashMap<String, String>>;
}

/// Builds the prompt for the current turn from the session's queues.
#[derive(Clone)]
pub struct PromptBuilder {
    templates: Arc<dyn TemplateSource>,
}

impl PromptBuilder {
    pub fn new(templates: Arc<dyn TemplateSource>) -> Self {
        Self { templates }
    }

    /// Picks the prompt shape from the current target's phase.
    pub async fn build(&self, session_id: Uuid, queues: &Queues) -> Result<DialoguePrompt> {
        let Some(target) = queues.current_target() else {
            return Ok(DialoguePrompt::Completed);
        };

        match target.phase() {
            ItemPhase::Unintroduced => {
                let sections = self
                    .templates
                    .load(PROMPT_TEMPLATE_FILE)
                    .await
                    .map_err(|e| CoachError::Template(format!("{e:#}")))?;
                let templates = PromptTemplates::from_sections(&sections)?;
                Ok(DialoguePrompt::Introduction(introduction_prompt(
                    session_id, target, queues, &templates,
                )))
            }
            ItemPhase::Reinforcing | ItemPhase::Mastered => {
                Ok(DialoguePrompt::Reinforcement(reinforcement_prompt(target, &queues.learned_pool)))
            }
        }
    }
}

pub fn introduction_prompt(
    session_id: Uuid,
    target: &LearningItem,
    queues: &Queues,
    templates: &PromptTemplates,
) -> Prompt {
    Prompt {
        header: PromptHeader {
            session_id: session_id.to_string(),
            new_target: HeaderItem::from(target),
            learned_pool: queues.learned_pool.iter().map(HeaderItem::from).collect(),
            delimiter: DELIMITER.to_string(),
        },
        body: templates.introduction_body(target, &queues.learned_pool),
    }
}

pub fn reinforcement_prompt(target: &LearningItem, learned_pool: &[LearningItem]) -> String {
    let token = &target.token;
    format!(
        "Generate natural German dialogue using only '{token}' and items from the learned pool: {pool}. \
         Bias towards less used or less familiar items (consider their usage and presentation counts). \
         Avoid repeating the same learned pool item twice in a row. \
         Frequently use strategic questions to elicit the learner's use of '{token}'.",
        pool = pool_tokens(learned_pool),
    )
}
