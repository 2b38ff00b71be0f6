//! Error types for the quiz participant client.

use thiserror::Error;

use crate::domain::AnswerOutcome;

/// A join request with missing fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill in all fields (missing: {})", .missing.join(", "))]
pub struct ValidationError {
    /// Names of the empty fields, in form order
    pub missing: Vec<&'static str>,
}

/// A push event payload that could not be understood
///
/// Parse errors are recoverable: the event is dropped and the channel stays open.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload is not valid JSON
    #[error("'{event}' payload is not JSON: {source}")]
    InvalidJson {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// Payload is JSON but lacks required fields
    #[error("'{event}' payload is missing required fields: {source}")]
    MissingFields {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// Event name the client does not handle
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

/// Failure of the answer submission call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The request did not reach the server or the response was cut off
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("server responded {status}: {body}")]
    Server { status: u16, body: String },

    /// The base URL cannot carry the answer path
    #[error("invalid answer url: {0}")]
    InvalidUrl(String),
}

/// A verdict that names neither correct nor incorrect
///
/// Not fatal: the configured policy decides the outcome and the answer
/// record keeps the fact that it was decided that way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ambiguous verdict '{body}', counted as {resolved_as}")]
pub struct AmbiguousOutcome {
    pub body: String,
    pub resolved_as: AnswerOutcome,
}

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Join fields are missing
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Push channel failed to open or closed unexpectedly
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Malformed push payload
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Answer submission failed
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The session cannot accept the request in its current state
    #[error("session is {0}")]
    InvalidState(&'static str),
}
