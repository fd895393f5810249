//! Persistence Contract
//!
//! Defines what the session state machine needs from durable storage. The
//! file-backed implementation lives with the service that owns the store root.

use crate::{error::Result, queues::Queues};
use async_trait::async_trait;

/// Durable storage for a learner's [`Queues`].
///
/// Implementations must serialize all operations against one instance so a
/// load never observes a half-written save, and a later save always wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LearningRepository: Send + Sync {
    /// Loads the persisted queues, bootstrapping from the bundled template on
    /// first use and recovering from it when the persisted documents are corrupt.
    async fn load_queues(&self) -> Result<Queues>;

    /// Persists both collections, each with an all-or-nothing write.
    async fn save_queues(&self, queues: &Queues) -> Result<()>;
}
