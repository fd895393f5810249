use serde::{Deserialize, Serialize};

/// Number of times the learner must use a target before it counts as mastered.
pub const MASTERY_QUOTA: u32 = 3;

/// A single teachable word or phrase and its progress counters.
///
/// Unknown fields in persisted documents are ignored and missing counters
/// default to zero, so older and newer documents both load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: String,
    #[serde(alias = "text")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub presentation_count: u32,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default)]
    pub is_learned: bool,
}

/// Where an item stands in its teaching lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPhase {
    /// Never presented nor used; the next prompt must introduce it.
    Unintroduced,
    /// Introduced at least once and still below the mastery quota.
    Reinforcing,
    /// Promoted to the learned pool.
    Mastered,
}

impl LearningItem {
    /// Creates a fresh, unlearned item.
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            category: None,
            subcategory: None,
            presentation_count: 0,
            usage_count: 0,
            is_learned: false,
        }
    }

    pub fn with_counts(mut self, presentation_count: u32, usage_count: u32) -> Self {
        self.presentation_count = presentation_count;
        self.usage_count = usage_count;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self.subcategory = Some(subcategory.into());
        self
    }

    /// The only place the phase is derived from the raw counters.
    pub fn phase(&self) -> ItemPhase {
        if self.is_learned {
            ItemPhase::Mastered
        } else if self.presentation_count == 0 && self.usage_count == 0 {
            ItemPhase::Unintroduced
        } else {
            ItemPhase::Reinforcing
        }
    }

    /// Case-insensitive substring check of the token against an utterance.
    ///
    /// An empty utterance or an empty token never counts as a use.
    pub fn is_used_in(&self, utterance: &str) -> bool {
        let token = self.token.trim();
        if token.is_empty() || utterance.trim().is_empty() {
            return false;
        }
        utterance.to_lowercase().contains(&token.to_lowercase())
    }

    pub fn has_reached_quota(&self) -> bool {
        self.usage_count >= MASTERY_QUOTA
    }

    /// Clears both counters so the item starts its introduction phase again.
    pub fn reset_progress(&mut self) {
        self.presentation_count = 0;
        self.usage_count = 0;
    }
}
