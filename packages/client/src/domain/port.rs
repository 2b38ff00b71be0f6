//! Interfaces the session needs from the network.
//!
//! The session logic depends on these traits only; `crate::infrastructure`
//! provides the HTTP implementations and tests provide scripted fakes.

use async_trait::async_trait;

use crate::error::{ClientError, SubmissionError};

use super::{
    entity::Selection,
    value_object::{JoinRequest, QuestionId, QuizId, Username},
};

/// A named event as framed by the transport, data not yet decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub name: String,
    pub data: String,
}

impl RawEvent {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// An open subscription to the server event stream
#[async_trait]
pub trait PushTransport: Send {
    /// Next event in server send order
    ///
    /// `None` means the server ended the stream; `Some(Err(_))` is a
    /// transport failure. Neither is followed by further events.
    async fn next_event(&mut self) -> Option<Result<RawEvent, ClientError>>;
}

/// Opens push subscriptions scoped to a join request
#[async_trait]
pub trait PushConnector: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionError`] when the server refuses the
    /// join or cannot be reached.
    async fn connect(&self, request: &JoinRequest) -> Result<Box<dyn PushTransport>, ClientError>;
}

/// One answer submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub quiz_id: QuizId,
    pub question_id: QuestionId,
    pub selection: Selection,
    pub username: Username,
}

/// The answer endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerApi: Send + Sync {
    /// Perform exactly one submission call and return the response body
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] on network failure or a non-success status.
    async fn submit(&self, request: &SubmitRequest) -> Result<String, SubmissionError>;
}
