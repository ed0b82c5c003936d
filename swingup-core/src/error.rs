//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// Only [`SwingupError::TransportFault`] is recoverable: the training loop skips
/// the current tick and carries on. Every other variant is fatal.
#[derive(Error, Debug)]
pub enum SwingupError {
    /// A parameter is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A command could not be sent, or a telemetry frame was rejected.
    #[error("Transport fault: {0}")]
    TransportFault(String),

    /// No agent data has been saved at the given path yet.
    #[error("Agent data not found: {0:?}")]
    PersistenceAbsent(PathBuf),

    /// Saved agent data exists but cannot be used.
    #[error("Agent data at {path:?} is corrupt: {reason}")]
    PersistenceCorrupt {
        /// Where the data was read from.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// An observation or action has the wrong number of elements.
    #[error("Dimension mismatch: expected {expected}, but {actual}")]
    DimensionMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Given number of elements.
        actual: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

impl SwingupError {
    /// Returns `true` if the error must not abort an episode.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransportFault(_))
    }

    /// Returns `true` if `err` wraps a recoverable [`SwingupError`].
    pub fn is_recoverable_error(err: &anyhow::Error) -> bool {
        err.downcast_ref::<SwingupError>()
            .map_or(false, SwingupError::is_recoverable)
    }

    /// Returns `true` if `err` wraps [`SwingupError::PersistenceAbsent`].
    pub fn is_persistence_absent(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<SwingupError>(),
            Some(SwingupError::PersistenceAbsent(_))
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_recoverable_through_anyhow() {
        let err: anyhow::Error = SwingupError::TransportFault("short read".into()).into();
        assert!(SwingupError::is_recoverable_error(&err));

        let err = err.context("run step error");
        assert!(SwingupError::is_recoverable_error(&err));

        let err: anyhow::Error = SwingupError::DimensionMismatch {
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(!SwingupError::is_recoverable_error(&err));
        assert!(!SwingupError::is_recoverable_error(&anyhow::anyhow!("io")));
    }

    #[test]
    fn test_persistence_absent() {
        let err: anyhow::Error = SwingupError::PersistenceAbsent("agent_up.bin".into()).into();
        assert!(SwingupError::is_persistence_absent(&err));
        assert!(!SwingupError::is_recoverable_error(&err));
    }
}
