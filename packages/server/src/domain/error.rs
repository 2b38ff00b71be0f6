//! Domain errors.

use thiserror::Error;

/// Errors raised by the quiz store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("quiz {0} does not exist")]
    QuizNotFound(i64),

    #[error("quiz {0} is not open")]
    QuizNotOpen(i64),

    #[error("quiz {0} has already started")]
    AlreadyStarted(i64),
}

/// Errors raised while pushing events to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventPushError {
    #[error("subscriber '{0}' not found")]
    SubscriberNotFound(String),

    #[error("subscriber '{0}' already has an open stream")]
    AlreadySubscribed(String),

    #[error("failed to push event: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
