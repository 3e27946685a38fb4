//! Discussion Error Types
//!
//! Central error type for the coordinator and its config file. Transient
//! platform failures (starting a session twice, stopping one that is not
//! running) are not errors here: they live in
//! [`crate::recognition::SessionError`] and are discarded by the coordinator.

use thiserror::Error;

/// Central error type for the discussion coordinator
#[derive(Error, Debug)]
pub enum DiscussionError {
    /// A recognition result arrived but nobody is listening for it.
    #[error("No event handler registered for a recognition result")]
    NoResultHandler,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for discussion operations
pub type DiscussionResult<T> = Result<T, DiscussionError>;
