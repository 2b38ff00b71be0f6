//! Score and rank bookkeeping for one session.

use std::collections::HashSet;

use super::{
    entity::{AnswerOutcome, RankResult},
    value_object::QuestionId,
};

/// Accumulates correctness feedback and keeps the final rank
#[derive(Debug, Default, Clone)]
pub struct ScoreTracker {
    score: u32,
    scored: HashSet<QuestionId>,
    rank: Option<RankResult>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rank(&self) -> Option<&RankResult> {
        self.rank.as_ref()
    }

    /// Count a correct answer
    ///
    /// Returns `true` when the score went up: `outcome` is `Correct` and
    /// `question_id` has not been counted before.
    pub fn record_outcome(&mut self, question_id: QuestionId, outcome: AnswerOutcome) -> bool {
        if outcome != AnswerOutcome::Correct || !self.scored.insert(question_id) {
            return false;
        }
        self.score += 1;
        true
    }

    /// Store the final rank
    ///
    /// Only the first call has an effect; returns whether it was stored.
    pub fn record_rank(&mut self, rank: RankResult) -> bool {
        if self.rank.is_some() {
            tracing::debug!("Rank already recorded, ignoring {:?}", rank);
            return false;
        }
        self.rank = Some(rank);
        true
    }
}
