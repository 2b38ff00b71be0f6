//! Entities of the participant session.

use std::fmt;

use quizcast_shared::dto::{QuestionPayload, UserRankPayload};

use crate::error::AmbiguousOutcome;

use super::value_object::{OptionToken, QuestionId};

/// A question pushed by the host
///
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionToken>,
}

impl Question {
    pub fn has_option(&self, option: OptionToken) -> bool {
        self.options.contains(&option)
    }
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        Self {
            id: QuestionId::new(payload.id),
            prompt: payload.question,
            options: payload.answers.into_iter().map(OptionToken::new).collect(),
        }
    }
}

/// What was submitted for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The participant picked an option
    Chosen(OptionToken),
    /// Nothing was picked before the countdown ran out
    Empty,
}

impl Selection {
    pub fn option(self) -> Option<OptionToken> {
        match self {
            Self::Chosen(option) => Some(option),
            Self::Empty => None,
        }
    }
}

/// Resolution of an answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Pending,
    Correct,
    Incorrect,
    TimedOut,
    Failed,
}

impl AnswerOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::TimedOut => "timed out",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// How a submission resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: AnswerOutcome,
    /// Present when the policy, not the verdict, decided `outcome`
    pub ambiguous: Option<AmbiguousOutcome>,
}

impl Resolution {
    pub fn ambiguous(error: AmbiguousOutcome) -> Self {
        Self {
            outcome: error.resolved_as,
            ambiguous: Some(error),
        }
    }
}

impl From<AnswerOutcome> for Resolution {
    fn from(outcome: AnswerOutcome) -> Self {
        Self {
            outcome,
            ambiguous: None,
        }
    }
}

/// The participant's one response to one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selection: Selection,
    /// Unix timestamp (milliseconds)
    pub submitted_at: i64,
    outcome: AnswerOutcome,
    ambiguous: bool,
}

impl AnswerRecord {
    /// A freshly dispatched submission, outcome `Pending`
    pub fn pending(question_id: QuestionId, selection: Selection, submitted_at: i64) -> Self {
        Self {
            question_id,
            selection,
            submitted_at,
            outcome: AnswerOutcome::Pending,
            ambiguous: false,
        }
    }

    pub fn outcome(&self) -> AnswerOutcome {
        self.outcome
    }

    /// The outcome was decided by the ambiguous-verdict policy
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    /// Settle the outcome
    ///
    /// Returns `false` (and leaves the record untouched) when the record is
    /// already terminal or the outcome is `Pending`.
    pub fn resolve(&mut self, resolution: impl Into<Resolution>) -> bool {
        let resolution = resolution.into();
        if self.outcome.is_terminal() || !resolution.outcome.is_terminal() {
            return false;
        }
        self.outcome = resolution.outcome;
        self.ambiguous = resolution.ambiguous.is_some();
        true
    }
}

/// Final standing announced by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankResult {
    pub username: String,
    pub rank: i64,
}

impl From<UserRankPayload> for RankResult {
    fn from(payload: UserRankPayload) -> Self {
        Self {
            username: payload.username,
            rank: payload.rank,
        }
    }
}
