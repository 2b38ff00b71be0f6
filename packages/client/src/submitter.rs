//! Answer submitter.
//!
//! Performs exactly one call per submission and turns the response into an
//! [`AnswerOutcome`]. It never retries; the caller decides whether the
//! outcome still matters.

use std::sync::Arc;

use quizcast_shared::dto::AnswerVerdictPayload;

use crate::{
    config::AmbiguousPolicy,
    domain::{AnswerApi, AnswerOutcome, Resolution, Selection, SubmitRequest},
    error::AmbiguousOutcome,
};

/// How a success body reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Neither indicator present
    Ambiguous,
}

/// Classify a verdict body
///
/// A structured `{"correct": bool}` body is taken as is. Text is matched
/// case-insensitively, "incorrect" before "correct".
pub fn classify_body(body: &str) -> Verdict {
    if let Ok(payload) = serde_json::from_str::<AnswerVerdictPayload>(body) {
        return if payload.correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
    }

    let text = body.to_lowercase();
    if text.contains("incorrect") {
        Verdict::Incorrect
    } else if text.contains("correct") {
        Verdict::Correct
    } else {
        Verdict::Ambiguous
    }
}

#[derive(Clone)]
pub struct AnswerSubmitter {
    api: Arc<dyn AnswerApi>,
    policy: AmbiguousPolicy,
}

impl AnswerSubmitter {
    pub fn new(api: Arc<dyn AnswerApi>, policy: AmbiguousPolicy) -> Self {
        Self { api, policy }
    }

    /// Submit once and resolve the outcome
    ///
    /// An empty selection resolves to `TimedOut` whatever the verdict; a
    /// failed call resolves to `Failed`. An ambiguous verdict is resolved by
    /// the policy and carries an [`AmbiguousOutcome`].
    pub async fn submit(&self, request: &SubmitRequest) -> Resolution {
        let body = match self.api.submit(request).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    "Submission for question {} failed: {}",
                    request.question_id,
                    e
                );
                return AnswerOutcome::Failed.into();
            }
        };

        if request.selection == Selection::Empty {
            return AnswerOutcome::TimedOut.into();
        }

        match classify_body(&body) {
            Verdict::Correct => AnswerOutcome::Correct.into(),
            Verdict::Incorrect => AnswerOutcome::Incorrect.into(),
            Verdict::Ambiguous => {
                let resolved_as = match self.policy {
                    AmbiguousPolicy::TreatAsCorrect => AnswerOutcome::Correct,
                    AmbiguousPolicy::TreatAsIncorrect => AnswerOutcome::Incorrect,
                };
                let ambiguous = AmbiguousOutcome { body, resolved_as };
                tracing::warn!("Question {}: {}", request.question_id, ambiguous);
                Resolution::ambiguous(ambiguous)
            }
        }
    }
}
