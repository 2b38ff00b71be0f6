//! Data Transfer Objects exchanged between the host server and participants.
//!
//! The push channel carries named events whose data is JSON. The answer
//! endpoint takes its arguments as query parameters and answers with a short
//! verdict text (or, from newer hosts, a JSON verdict object).

use serde::{Deserialize, Serialize};

/// Event carrying a question, and also the subscription acknowledgment
pub const QUESTION_EVENT: &str = "question";

/// Terminal event carrying the participant's final rank
pub const USER_RANK_EVENT: &str = "user-rank";

/// Marker contained in the acknowledgment pushed right after subscribing
pub const SUBSCRIBE_COMPLETE_MARKER: &str = "subscribe complete";

/// Verdict body for a correct answer
pub const CORRECT_VERDICT: &str = "Correct!";

/// Verdict body for an incorrect answer
pub const INCORRECT_VERDICT: &str = "Incorrect";

/// Rank reported for a participant missing from the ranking
pub const UNRANKED: i64 = -1;

/// Build the acknowledgment text pushed to a freshly subscribed participant
pub fn subscribe_ack(username: &str) -> String {
    format!("{}, username: {}", SUBSCRIBE_COMPLETE_MARKER, username)
}

/// `question` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub id: i64,
    pub question: String,
    /// Option tokens in display order
    pub answers: Vec<i64>,
}

/// `user-rank` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRankPayload {
    pub username: String,
    pub rank: i64,
}

/// Query parameters of the subscribe request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeQuery {
    pub quiz_id: String,
    pub pin: String,
    pub username: String,
}

/// Query parameters of the answer request
///
/// `answer` is omitted for the implicit empty submission sent on timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuery {
    pub username: String,
    pub question_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<i64>,
}

/// Structured verdict body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerVerdictPayload {
    pub correct: bool,
}

/// Response of the open-quiz request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenQuizResponse {
    pub quiz_id: i64,
    pub pin: String,
}
