//! Error taxonomy shared by every coaching component.

use std::path::PathBuf;

/// Failures surfaced by the coaching core.
///
/// `Serialization` failures while *loading* queues never reach callers of the
/// persistence store; they are recovered from the bundled template instead.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// The filesystem was unreachable or refused the operation.
    #[error("storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A document could not be encoded or decoded.
    #[error("malformed {context}: {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    /// An operation was invoked in the wrong session state.
    #[error("{0}")]
    State(String),
    /// The external dialogue generator failed.
    #[error("dialogue generation failed: {0:#}")]
    Upstream(anyhow::Error),
    /// A prompt template was missing or incomplete.
    #[error("prompt template error: {0}")]
    Template(String),
}

impl CoachError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    pub fn not_started() -> Self {
        Self::State("Session not started".to_string())
    }
}

pub type Result<T, E = CoachError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_display() {
        assert_eq!(CoachError::not_started().to_string(), "Session not started");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = CoachError::io(
            "/tmp/queues/new_queue.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("/tmp/queues/new_queue.json"));
        assert!(rendered.contains("denied"));
    }

    #[test]
    fn test_upstream_error_display_includes_cause_chain() {
        let err = CoachError::Upstream(anyhow::anyhow!("503 Service Unavailable").context("chat call"));
        let rendered = err.to_string();
        assert!(rendered.starts_with("dialogue generation failed"));
        assert!(rendered.contains("503"));
    }
}
