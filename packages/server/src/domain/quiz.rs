//! Quiz domain model.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use quizcast_shared::dto::{QuestionPayload, UNRANKED};

/// A question as authored by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub title: String,
    /// Option texts; participants see them as numbers `1..=n`
    pub options: Vec<String>,
    /// Number of the correct option (1-based)
    pub correct: i64,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: Option<i64>) -> bool {
        answer == Some(self.correct)
    }

    /// What participants receive: the option numbers, not the texts
    pub fn to_payload(&self) -> QuestionPayload {
        QuestionPayload {
            id: self.id,
            question: self.title.clone(),
            answers: (1..=self.options.len() as i64).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn question(&self, question_id: i64) -> Option<&QuizQuestion> {
        self.questions.iter().find(|question| question.id == question_id)
    }
}

/// Four-digit PIN guarding an open quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPin(String);

impl QuizPin {
    /// Random PIN in `1000..=9999`
    pub fn generate() -> Self {
        let value = uuid::Uuid::new_v4().as_u128() % 9000 + 1000;
        Self(value.to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate.trim()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One line of the final ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub username: String,
    pub score: u32,
    pub rank: i64,
}

/// Scores of one live quiz
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    scores: HashMap<String, u32>,
    answered: HashSet<(String, i64)>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `username` appear in the ranking, with zero points if new
    pub fn add_participant(&mut self, username: &str) {
        self.scores.entry(username.to_string()).or_insert(0);
    }

    /// Count a correct answer; a question scores at most once per user
    pub fn record_correct(&mut self, username: &str, question_id: i64) -> bool {
        if !self.answered.insert((username.to_string(), question_id)) {
            return false;
        }
        *self.scores.entry(username.to_string()).or_insert(0) += 1;
        true
    }

    pub fn score(&self, username: &str) -> u32 {
        self.scores.get(username).copied().unwrap_or(0)
    }

    /// Score descending, ties broken by username; ranks are 1-based
    pub fn ranking(&self) -> Vec<RankEntry> {
        let mut entries: Vec<(&String, &u32)> = self.scores.iter().collect();
        entries.sort_by(|(a_name, a_score), (b_name, b_score)| {
            b_score.cmp(a_score).then_with(|| a_name.cmp(b_name))
        });
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (username, score))| RankEntry {
                username: username.clone(),
                score: *score,
                rank: index as i64 + 1,
            })
            .collect()
    }

    /// Rank of `username`, or [`UNRANKED`] when absent
    pub fn rank_of(&self, username: &str) -> i64 {
        self.ranking()
            .into_iter()
            .find(|entry| entry.username == username)
            .map_or(UNRANKED, |entry| entry.rank)
    }
}

/// A quiz opened for play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuiz {
    pub quiz_id: i64,
    pub pin: QuizPin,
    pub started: bool,
    pub scoreboard: Scoreboard,
}

impl LiveQuiz {
    pub fn new(quiz_id: i64, pin: QuizPin) -> Self {
        Self {
            quiz_id,
            pin,
            started: false,
            scoreboard: Scoreboard::new(),
        }
    }
}
