//! Lango coaching core.
//!
//! Tracks a learner's progress through a queue of vocabulary items, decides
//! when an item is mastered, and builds the prompts the dialogue generator
//! turns into the coach's spoken lines.

pub mod dialogue;
pub mod error;
pub mod item;
pub mod orchestrator;
pub mod prompt;
pub mod queues;
pub mod repository;
pub mod session;

pub use error::{CoachError, Result};
pub use item::{ItemPhase, LearningItem, MASTERY_QUOTA};
pub use orchestrator::{CoachOrchestrator, CoachReply, ReplyKind};
pub use queues::{Queues, TurnEffect};
pub use session::{Session, SessionState, TurnOutcome};
