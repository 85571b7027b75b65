//! Error taxonomy for the qualification core
//!
//! Non-fatal variants are recovered inside a turn and downgraded to
//! "no new information"; only `StatePersistenceFailed` aborts a turn.

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// Embedding or vector index backend failure. Callers degrade to an
    /// ungrounded response instead of blocking the turn.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Classification/extraction backend failure or malformed structured
    /// output. Treated as "no new fields this turn".
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// A field value failed format rules. Surfaced to the user as a
    /// targeted re-ask, never as a system error.
    #[error("Validation rejected for {field}: {reason}")]
    ValidationRejected { field: String, reason: String },

    /// Fatal to the turn: no response is shown without persisted state.
    #[error("State persistence failed: {0}")]
    StatePersistenceFailed(String),

    /// Not an error in practice; unknown sessions initialize fresh state.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Configuration problem detected at startup or wiring time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the turn must abort rather than degrade.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StatePersistenceFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persistence_is_fatal() {
        assert!(Error::StatePersistenceFailed("db down".into()).is_fatal());
        assert!(!Error::RetrievalUnavailable("index down".into()).is_fatal());
        assert!(!Error::ExtractionFailed("bad json".into()).is_fatal());
        assert!(!Error::ValidationRejected {
            field: "email".into(),
            reason: "syntax".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_display() {
        let e = Error::ValidationRejected {
            field: "phone".into(),
            reason: "unparseable".into(),
        };
        assert_eq!(e.to_string(), "Validation rejected for phone: unparseable");
    }
}
