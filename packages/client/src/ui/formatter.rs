//! Snapshot rendering for the terminal.

use quizcast_shared::{dto::UNRANKED, time::timestamp_to_jst_rfc3339};

use crate::domain::{
    AnswerOutcome, ConnectionState, Question, RankResult, Selection, SessionSnapshot, SessionState,
};

const RULE: &str = "------------------------------------------------------------";
const DOUBLE_RULE: &str = "============================================================";

/// Snapshot formatter for client display
pub struct SnapshotFormatter;

impl SnapshotFormatter {
    /// Lines to print when the session moves from `prev` to `next`
    ///
    /// Only what changed is rendered, so repeated snapshots print nothing.
    ///
    /// # Arguments
    ///
    /// * `prev` - The snapshot last rendered
    /// * `next` - The snapshot just published
    /// * `now` - Unix timestamp used for the closing banner (milliseconds)
    pub fn format_transition(
        prev: &SessionSnapshot,
        next: &SessionSnapshot,
        now: i64,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        if prev.connection != next.connection && next.connection == ConnectionState::Connected {
            lines.push(Self::format_connected());
        }

        let question_changed = match (&prev.question, &next.question) {
            (Some(before), Some(after)) => before.id != after.id,
            (None, Some(_)) => true,
            _ => false,
        };
        if question_changed && let Some(question) = next.question.as_ref() {
            lines.push(Self::format_question(question, next.countdown));
        } else if prev.countdown != next.countdown
            && next.state == SessionState::QuestionActive
            && let Some(line) = Self::format_countdown(next.countdown)
        {
            lines.push(line);
        }

        if prev.selection != next.selection
            && let Some(selection) = next.selection
        {
            lines.push(Self::format_submitted(selection));
        }

        let verdict = next
            .outcome
            .filter(|outcome| prev.outcome != next.outcome && outcome.is_terminal());
        if let Some(outcome) = verdict {
            lines.push(Self::format_outcome(outcome, next.score, next.ambiguous));
        } else if prev.score != next.score {
            lines.push(Self::format_score(next.score));
        }

        if prev.state != next.state {
            match next.state {
                SessionState::Finished => {
                    lines.push(Self::format_finished(next.score, next.rank.as_ref(), now))
                }
                SessionState::Failed => lines.push(Self::format_failed(
                    next.error.as_deref().unwrap_or("unknown error"),
                )),
                _ => {}
            }
        }

        lines
    }

    pub fn format_connected() -> String {
        "\nJoined. Waiting for the first question...\n".to_string()
    }

    /// Format a newly current question with its options
    ///
    /// # Arguments
    ///
    /// * `question` - The question to display
    /// * `seconds` - Seconds left to answer
    pub fn format_question(question: &Question, seconds: u32) -> String {
        let options = question
            .options
            .iter()
            .map(|option| format!("[{}]", option))
            .collect::<Vec<_>>()
            .join("  ");
        format!(
            "\n{RULE}\nQ{}: {}\n{}\n{} seconds to answer\n{RULE}\n",
            question.id, question.prompt, options, seconds
        )
    }

    /// Countdown line, only at notable values
    pub fn format_countdown(remaining: u32) -> Option<String> {
        match remaining {
            0 => Some("Time is up!\n".to_string()),
            1..=3 => Some(format!("{}...\n", remaining)),
            n if n % 5 == 0 => Some(format!("{} seconds left\n", n)),
            _ => None,
        }
    }

    pub fn format_submitted(selection: Selection) -> String {
        match selection {
            Selection::Chosen(option) => format!("Answered {}, waiting for the verdict\n", option),
            Selection::Empty => "No answer given\n".to_string(),
        }
    }

    /// Format a resolved answer
    ///
    /// An `ambiguous` verdict is one the host answered with a body that was
    /// neither correct nor incorrect, counted by the configured policy.
    pub fn format_outcome(outcome: AnswerOutcome, score: u32, ambiguous: bool) -> String {
        let verdict = match outcome {
            AnswerOutcome::Correct => "Correct!",
            AnswerOutcome::Incorrect => "Incorrect",
            AnswerOutcome::TimedOut => "Timed out",
            AnswerOutcome::Failed => "Answer could not be submitted",
            AnswerOutcome::Pending => "Pending",
        };
        let note = if ambiguous {
            " [unclear verdict from host]"
        } else {
            ""
        };
        format!("{}{} (score: {})\n", verdict, note, score)
    }

    pub fn format_score(score: u32) -> String {
        format!("Score: {}\n", score)
    }

    /// Format the closing banner with the final score and rank
    ///
    /// # Arguments
    ///
    /// * `score` - Number of correct answers
    /// * `rank` - Final standing, if the host announced one
    /// * `finished_at` - Unix timestamp when the quiz ended (milliseconds)
    pub fn format_finished(score: u32, rank: Option<&RankResult>, finished_at: i64) -> String {
        let standing = match rank {
            Some(rank) if rank.rank != UNRANKED => format!("rank #{}", rank.rank),
            _ => "unranked".to_string(),
        };
        format!(
            "\n{DOUBLE_RULE}\nQuiz over! score: {}, {}\nfinished at {}\n{DOUBLE_RULE}\n",
            score,
            standing,
            timestamp_to_jst_rfc3339(finished_at)
        )
    }

    pub fn format_failed(reason: &str) -> String {
        format!("\nSession failed: {}\n", reason)
    }
}
