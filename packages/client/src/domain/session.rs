//! Session state machine of a live quiz participant.
//!
//! Three sources feed the machine: the push channel (questions, final rank,
//! channel failure), the per-question countdown (ticks, expiry) and answer
//! submissions (their resolved outcome). The machine never performs I/O; each
//! input returns the [`Effect`]s the driver has to carry out, so every
//! interleaving of inputs can be replayed deterministically in tests.
//!
//! Every transition that involves a question is guarded by question id:
//! inputs about a question that is no longer current only touch that
//! question's own [`AnswerRecord`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use quizcast_shared::time::Clock;

use crate::error::ClientError;

use super::{
    entity::{AnswerOutcome, AnswerRecord, Question, RankResult, Resolution, Selection},
    port::SubmitRequest,
    score::ScoreTracker,
    value_object::{JoinRequest, OptionToken, QuestionId},
};

/// Lifecycle of the participant session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Joining,
    AwaitingQuestion,
    QuestionActive,
    AwaitingNextQuestionOrEnd,
    Finished,
    Failed,
}

impl SessionState {
    /// States in which the push channel is expected to deliver events
    fn is_live(self) -> bool {
        matches!(
            self,
            Self::AwaitingQuestion | Self::QuestionActive | Self::AwaitingNextQuestionOrEnd
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Joining => "joining",
            Self::AwaitingQuestion => "awaiting question",
            Self::QuestionActive => "question active",
            Self::AwaitingNextQuestionOrEnd => "awaiting next question",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// State of the push subscription as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

/// Decoded push channel event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Question(Question),
    UserRank(RankResult),
}

/// Side effect requested by the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the push subscription for this join
    OpenChannel(JoinRequest),
    /// Close the push subscription
    CloseChannel,
    /// Restart the countdown for a newly current question
    ResetTimer {
        question_id: QuestionId,
        duration_secs: u32,
    },
    /// Stop the countdown without expiry
    StopTimer,
    /// Dispatch the single submission call for a question
    Submit(SubmitRequest),
}

/// Render-ready view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub connection: ConnectionState,
    pub question: Option<Question>,
    pub countdown: u32,
    /// What was submitted for the current question
    pub selection: Option<Selection>,
    /// Outcome of the current question's submission
    pub outcome: Option<AnswerOutcome>,
    /// The current outcome was decided by the ambiguous-verdict policy
    pub ambiguous: bool,
    pub score: u32,
    pub rank: Option<RankResult>,
    /// Reason the session failed
    pub error: Option<String>,
    /// The session no longer accepts input
    pub closed: bool,
}

/// The orchestrator owning all session state
pub struct SessionStateMachine {
    max_duration: u32,
    clock: Arc<dyn Clock>,
    state: SessionState,
    connection: ConnectionState,
    join: Option<JoinRequest>,
    current: Option<Question>,
    served: HashSet<QuestionId>,
    countdown: u32,
    records: HashMap<QuestionId, AnswerRecord>,
    tracker: ScoreTracker,
    error: Option<String>,
    closed: bool,
}

impl SessionStateMachine {
    /// Create an idle session
    ///
    /// # Arguments
    ///
    /// * `max_duration` - Seconds a participant has per question
    /// * `clock` - Source of AnswerRecord submission times
    pub fn new(max_duration: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_duration,
            clock,
            state: SessionState::Idle,
            connection: ConnectionState::Disconnected,
            join: None,
            current: None,
            served: HashSet::new(),
            countdown: max_duration,
            records: HashMap::new(),
            tracker: ScoreTracker::new(),
            error: None,
            closed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn record(&self, question_id: QuestionId) -> Option<&AnswerRecord> {
        self.records.get(&question_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.records.values()
    }

    pub fn score(&self) -> u32 {
        self.tracker.score()
    }

    pub fn rank(&self) -> Option<&RankResult> {
        self.tracker.rank()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let current_record = self
            .current
            .as_ref()
            .and_then(|question| self.records.get(&question.id));

        SessionSnapshot {
            state: self.state,
            connection: self.connection,
            question: self.current.clone(),
            countdown: self.countdown,
            selection: current_record.map(|record| record.selection),
            outcome: current_record.map(AnswerRecord::outcome),
            ambiguous: current_record.is_some_and(AnswerRecord::is_ambiguous),
            score: self.tracker.score(),
            rank: self.tracker.rank().cloned(),
            error: self.error.clone(),
            closed: self.closed,
        }
    }

    /// `Idle --submitJoin--> Joining`
    ///
    /// # Errors
    ///
    /// * [`ClientError::Validation`] when a field is blank; the session stays `Idle`
    /// * [`ClientError::InvalidState`] when the session already left `Idle`
    pub fn submit_join(
        &mut self,
        quiz_id: &str,
        pin: &str,
        username: &str,
    ) -> Result<Vec<Effect>, ClientError> {
        if self.state != SessionState::Idle || self.closed {
            return Err(ClientError::InvalidState(if self.closed {
                "closed"
            } else {
                "already joined"
            }));
        }

        let request = JoinRequest::new(quiz_id, pin, username)?;
        tracing::info!(
            "Joining quiz '{}' as '{}'",
            request.quiz_id,
            request.username
        );

        self.join = Some(request.clone());
        self.state = SessionState::Joining;
        self.connection = ConnectionState::Connecting;
        Ok(vec![Effect::OpenChannel(request)])
    }

    /// `Joining --channelOpened--> AwaitingQuestion`
    pub fn channel_opened(&mut self) -> Vec<Effect> {
        if self.closed || self.state != SessionState::Joining {
            tracing::debug!("Ignoring channel-opened in state '{}'", self.state);
            return Vec::new();
        }
        tracing::info!("Push channel open, waiting for the first question");
        self.state = SessionState::AwaitingQuestion;
        self.connection = ConnectionState::Connected;
        Vec::new()
    }

    /// Failure or unexpected close of the push channel
    ///
    /// Fatal to every state except `Finished`.
    pub fn channel_failed(&mut self, reason: &str) -> Vec<Effect> {
        if self.closed || self.state == SessionState::Idle {
            tracing::debug!("Ignoring channel failure in state '{}': {}", self.state, reason);
            return Vec::new();
        }

        let message = if self.state == SessionState::Joining {
            format!("unable to join: {}", reason)
        } else {
            format!("cannot continue: {}", reason)
        };
        tracing::error!("Session failed ({})", message);

        self.error = Some(message);
        self.connection = ConnectionState::Errored;
        self.shut_down(SessionState::Failed)
    }

    /// Dispatch a decoded push event
    pub fn push_event(&mut self, event: PushEvent) -> Vec<Effect> {
        match event {
            PushEvent::Question(question) => self.question_received(question),
            PushEvent::UserRank(rank) => self.rank_received(rank),
        }
    }

    /// A question arrived
    ///
    /// A question whose id was already served is a stale repeat and ignored.
    /// Any other question becomes current, even while the previous one is
    /// still active or its submission is still in flight.
    pub fn question_received(&mut self, question: Question) -> Vec<Effect> {
        if self.closed || !self.state.is_live() {
            tracing::debug!(
                "Ignoring question {} in state '{}'",
                question.id,
                self.state
            );
            return Vec::new();
        }
        if !self.served.insert(question.id) {
            tracing::debug!("Ignoring repeated question {}", question.id);
            return Vec::new();
        }

        tracing::info!("Question {} is now current", question.id);
        let question_id = question.id;
        self.current = Some(question);
        self.countdown = self.max_duration;
        self.state = SessionState::QuestionActive;
        vec![Effect::ResetTimer {
            question_id,
            duration_secs: self.max_duration,
        }]
    }

    /// The final rank arrived; terminal for the session
    pub fn rank_received(&mut self, rank: RankResult) -> Vec<Effect> {
        if self.closed || !self.state.is_live() {
            tracing::debug!("Ignoring rank {:?} in state '{}'", rank, self.state);
            return Vec::new();
        }

        tracing::info!("Final rank for '{}': {}", rank.username, rank.rank);
        self.tracker.record_rank(rank);
        self.connection = ConnectionState::Disconnected;
        self.shut_down(SessionState::Finished)
    }

    /// The participant picked an option for the current question
    ///
    /// A no-op unless a question is active, the option belongs to it and no
    /// submission exists for it yet.
    pub fn select_option(&mut self, option: OptionToken) -> Vec<Effect> {
        if self.closed || self.state != SessionState::QuestionActive {
            tracing::debug!("Ignoring selection {} in state '{}'", option, self.state);
            return Vec::new();
        }
        let Some(question) = self.current.as_ref() else {
            return Vec::new();
        };
        if !question.has_option(option) {
            tracing::debug!("Option {} is not offered by question {}", option, question.id);
            return Vec::new();
        }

        let question_id = question.id;
        self.dispatch_submission(question_id, Selection::Chosen(option))
            .into_iter()
            .collect()
    }

    /// One countdown second elapsed for `question_id`
    pub fn timer_tick(&mut self, question_id: QuestionId, remaining: u32) -> Vec<Effect> {
        if !self.closed && self.is_current(question_id) {
            self.countdown = remaining.min(self.max_duration);
        }
        Vec::new()
    }

    /// The countdown for `question_id` ran out
    ///
    /// Issues the implicit empty submission when the question is still current
    /// and nothing was submitted for it.
    pub fn timer_expired(&mut self, question_id: QuestionId) -> Vec<Effect> {
        if self.closed || !self.is_current(question_id) {
            tracing::debug!("Ignoring expiry for question {}", question_id);
            return Vec::new();
        }
        self.countdown = 0;
        if self.state != SessionState::QuestionActive {
            return Vec::new();
        }

        tracing::info!("Time is up for question {}", question_id);
        self.dispatch_submission(question_id, Selection::Empty)
            .into_iter()
            .collect()
    }

    /// A submission call came back
    ///
    /// The outcome settles the record of its own question. The session moves
    /// on only when that question is still the current one.
    pub fn submission_resolved(
        &mut self,
        question_id: QuestionId,
        resolution: impl Into<Resolution>,
    ) -> Vec<Effect> {
        let resolution = resolution.into();
        let outcome = resolution.outcome;
        if self.closed {
            tracing::debug!(
                "Session closed, dropping outcome '{}' for question {}",
                outcome,
                question_id
            );
            return Vec::new();
        }
        let Some(record) = self.records.get_mut(&question_id) else {
            tracing::warn!("No submission recorded for question {}", question_id);
            return Vec::new();
        };
        if let Some(ambiguous) = &resolution.ambiguous {
            tracing::debug!("Question {}: {}", question_id, ambiguous);
        }
        if !record.resolve(resolution) {
            tracing::debug!("Question {} already resolved", question_id);
            return Vec::new();
        }

        if self.tracker.record_outcome(question_id, outcome) {
            tracing::info!("Question {} correct, score {}", question_id, self.tracker.score());
        } else {
            tracing::info!("Question {} resolved as {}", question_id, outcome);
        }

        if self.state == SessionState::QuestionActive && self.is_current(question_id) {
            self.state = SessionState::AwaitingNextQuestionOrEnd;
        }
        Vec::new()
    }

    /// The participant navigated away
    pub fn leave(&mut self) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        tracing::info!("Leaving session in state '{}'", self.state);
        let effects = match self.state {
            SessionState::Idle => Vec::new(),
            _ => vec![Effect::StopTimer, Effect::CloseChannel],
        };
        self.closed = true;
        self.connection = ConnectionState::Disconnected;
        effects
    }

    fn is_current(&self, question_id: QuestionId) -> bool {
        self.current
            .as_ref()
            .is_some_and(|question| question.id == question_id)
    }

    /// Create the AnswerRecord and the submit effect, at most once per question
    fn dispatch_submission(
        &mut self,
        question_id: QuestionId,
        selection: Selection,
    ) -> Option<Effect> {
        if self.records.contains_key(&question_id) {
            tracing::debug!("Question {} already has a submission", question_id);
            return None;
        }
        let join = self.join.as_ref()?;

        let record = AnswerRecord::pending(question_id, selection, self.clock.now_millis());
        self.records.insert(question_id, record);

        Some(Effect::Submit(SubmitRequest {
            quiz_id: join.quiz_id.clone(),
            question_id,
            selection,
            username: join.username.clone(),
        }))
    }

    fn shut_down(&mut self, state: SessionState) -> Vec<Effect> {
        self.state = state;
        self.closed = true;
        vec![Effect::StopTimer, Effect::CloseChannel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmbiguousOutcome;
    use quizcast_shared::time::FixedClock;

    const MAX_DURATION: u32 = 10;
    const NOW: i64 = 1672498800000;

    fn create_machine() -> SessionStateMachine {
        SessionStateMachine::new(MAX_DURATION, Arc::new(FixedClock::new(NOW)))
    }

    fn question(id: i64, answers: &[i64]) -> Question {
        Question {
            id: QuestionId::new(id),
            prompt: format!("question {}", id),
            options: answers.iter().copied().map(OptionToken::new).collect(),
        }
    }

    /// Scenario A: joined, channel open and question 1 current
    fn create_active_machine() -> SessionStateMachine {
        let mut machine = create_machine();
        machine.submit_join("Q1", "1234", "alice").unwrap();
        machine.channel_opened();
        machine.question_received(Question {
            id: QuestionId::new(1),
            prompt: "2+2?".to_string(),
            options: vec![OptionToken::new(3), OptionToken::new(4), OptionToken::new(5)],
        });
        machine
    }

    fn submits(effects: &[Effect]) -> Vec<&SubmitRequest> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Submit(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_submit_join_moves_to_joining() {
        // テスト項目: 全項目入力済みの参加要求で Joining に遷移しチャンネルが開かれる
        // given (前提条件):
        let mut machine = create_machine();

        // when (操作):
        let effects = machine.submit_join("Q1", "1234", "alice").unwrap();

        // then (期待する結果):
        assert_eq!(machine.state(), SessionState::Joining);
        assert_eq!(machine.snapshot().connection, ConnectionState::Connecting);
        assert_eq!(
            effects,
            vec![Effect::OpenChannel(
                JoinRequest::new("Q1", "1234", "alice").unwrap()
            )]
        );
    }

    #[test]
    fn test_submit_join_with_blank_field_stays_idle() {
        // テスト項目: 空欄がある参加要求は ValidationError で拒否され Idle のまま
        // given (前提条件):
        let mut machine = create_machine();

        // when (操作):
        let result = machine.submit_join("Q1", "", "alice");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(machine.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_join_twice_is_rejected() {
        // テスト項目: 参加要求の二重送信は拒否される
        // given (前提条件):
        let mut machine = create_machine();
        machine.submit_join("Q1", "1234", "alice").unwrap();

        // when (操作):
        let result = machine.submit_join("Q1", "1234", "alice");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidState(_))));
        assert_eq!(machine.state(), SessionState::Joining);
    }

    #[test]
    fn test_channel_error_while_joining_fails_session() {
        // テスト項目: 参加中のチャンネルエラーで Failed になり "unable to join" が表示される
        // given (前提条件):
        let mut machine = create_machine();
        machine.submit_join("Q1", "1234", "alice").unwrap();

        // when (操作):
        let effects = machine.channel_failed("status 403");

        // then (期待する結果):
        assert_eq!(machine.state(), SessionState::Failed);
        assert!(machine.is_closed());
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.connection, ConnectionState::Errored);
        assert_eq!(snapshot.error.as_deref(), Some("unable to join: status 403"));
        assert_eq!(effects, vec![Effect::StopTimer, Effect::CloseChannel]);
    }

    #[test]
    fn test_scenario_a_first_question_becomes_active() {
        // テスト項目: シナリオ A - 最初の質問を受信すると QuestionActive になりカウントダウンが最大値
        // given (前提条件):
        let mut machine = create_machine();
        machine.submit_join("Q1", "1234", "alice").unwrap();
        machine.channel_opened();
        assert_eq!(machine.state(), SessionState::AwaitingQuestion);

        // when (操作):
        let effects = machine.question_received(question(1, &[3, 4, 5]));

        // then (期待する結果):
        assert_eq!(machine.state(), SessionState::QuestionActive);
        assert_eq!(machine.countdown(), MAX_DURATION);
        assert_eq!(
            effects,
            vec![Effect::ResetTimer {
                question_id: QuestionId::new(1),
                duration_secs: MAX_DURATION,
            }]
        );
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.selection, None);
        assert_eq!(snapshot.outcome, None);
    }

    #[test]
    fn test_scenario_b_correct_answer_scores() {
        // テスト項目: シナリオ B - 正解すると ScoreState が 1 になり次の質問待ちになる
        // given (前提条件):
        let mut machine = create_active_machine();

        // when (操作):
        let effects = machine.select_option(OptionToken::new(4));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Correct);

        // then (期待する結果):
        let requests = submits(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].question_id, QuestionId::new(1));
        assert_eq!(requests[0].selection, Selection::Chosen(OptionToken::new(4)));
        assert_eq!(requests[0].username.as_str(), "alice");
        assert_eq!(machine.score(), 1);
        assert_eq!(machine.state(), SessionState::AwaitingNextQuestionOrEnd);
        let record = machine.record(QuestionId::new(1)).unwrap();
        assert_eq!(record.outcome(), AnswerOutcome::Correct);
        assert_eq!(record.submitted_at, NOW);
    }

    #[test]
    fn test_ambiguous_verdict_is_flagged_in_snapshot() {
        // テスト項目: ポリシーで決まった判定はスナップショットで曖昧と分かる
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));

        // when (操作):
        machine.submission_resolved(
            QuestionId::new(1),
            Resolution::ambiguous(AmbiguousOutcome {
                body: "received".to_string(),
                resolved_as: AnswerOutcome::Correct,
            }),
        );

        // then (期待する結果):
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.outcome, Some(AnswerOutcome::Correct));
        assert!(snapshot.ambiguous);
        assert_eq!(snapshot.score, 1);
        assert!(machine.record(QuestionId::new(1)).unwrap().is_ambiguous());
    }

    #[test]
    fn test_state_stays_active_while_submission_in_flight() {
        // テスト項目: 送信中は QuestionActive のまま Pending が表示される
        // given (前提条件):
        let mut machine = create_active_machine();

        // when (操作):
        machine.select_option(OptionToken::new(4));

        // then (期待する結果):
        assert_eq!(machine.state(), SessionState::QuestionActive);
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.selection, Some(Selection::Chosen(OptionToken::new(4))));
        assert_eq!(snapshot.outcome, Some(AnswerOutcome::Pending));
    }

    #[test]
    fn test_reselection_is_a_no_op() {
        // テスト項目: 同じ質問への再選択は送信されない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));

        // when (操作):
        let effects = machine.select_option(OptionToken::new(3));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(
            machine.record(QuestionId::new(1)).unwrap().selection,
            Selection::Chosen(OptionToken::new(4))
        );
    }

    #[test]
    fn test_selecting_unknown_option_is_ignored() {
        // テスト項目: 質問にない選択肢は無視され、後から正しい選択肢を送信できる
        // given (前提条件):
        let mut machine = create_active_machine();

        // when (操作):
        let ignored = machine.select_option(OptionToken::new(9));
        let accepted = machine.select_option(OptionToken::new(5));

        // then (期待する結果):
        assert!(ignored.is_empty());
        assert_eq!(submits(&accepted).len(), 1);
    }

    #[test]
    fn test_scenario_c_timeout_submits_empty_answer() {
        // テスト項目: シナリオ C - 時間切れで空回答が送信され、TimedOut ではスコアが変わらない
        // given (前提条件):
        let mut machine = create_active_machine();
        for remaining in (0..MAX_DURATION).rev() {
            machine.timer_tick(QuestionId::new(1), remaining);
        }

        // when (操作):
        let effects = machine.timer_expired(QuestionId::new(1));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::TimedOut);

        // then (期待する結果):
        let requests = submits(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].selection, Selection::Empty);
        assert_eq!(machine.countdown(), 0);
        assert_eq!(machine.score(), 0);
        assert_eq!(machine.state(), SessionState::AwaitingNextQuestionOrEnd);
    }

    #[test]
    fn test_timeout_after_answer_produces_no_submission() {
        // テスト項目: 回答済みの質問で時間切れになっても送信は発生しない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Incorrect);

        // when (操作):
        let effects = machine.timer_expired(QuestionId::new(1));

        // then (期待する結果):
        assert!(submits(&effects).is_empty());
        assert_eq!(machine.state(), SessionState::AwaitingNextQuestionOrEnd);
    }

    #[test]
    fn test_timeout_while_submission_pending_produces_no_submission() {
        // テスト項目: 送信中に時間切れになっても二重送信されない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));

        // when (操作):
        let effects = machine.timer_expired(QuestionId::new(1));

        // then (期待する結果):
        assert!(submits(&effects).is_empty());
        assert_eq!(machine.records().count(), 1);
    }

    #[test]
    fn test_scenario_d_next_question_supersedes_pending_submission() {
        // テスト項目: シナリオ D - 送信中に次の質問が来ると質問が切り替わり、結果は元の質問にだけ反映される
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));
        machine.timer_tick(QuestionId::new(1), 6);

        // when (操作):
        let effects = machine.question_received(question(2, &[1, 2]));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Correct);

        // then (期待する結果):
        assert_eq!(
            effects,
            vec![Effect::ResetTimer {
                question_id: QuestionId::new(2),
                duration_secs: MAX_DURATION,
            }]
        );
        assert_eq!(machine.state(), SessionState::QuestionActive);
        assert_eq!(machine.countdown(), MAX_DURATION);
        assert_eq!(machine.score(), 1);
        assert_eq!(
            machine.record(QuestionId::new(1)).unwrap().outcome(),
            AnswerOutcome::Correct
        );
        assert!(machine.record(QuestionId::new(2)).is_none());
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.question.unwrap().id, QuestionId::new(2));
        assert_eq!(snapshot.selection, None);
        assert_eq!(snapshot.outcome, None);
    }

    #[test]
    fn test_stale_expiry_after_next_question_is_ignored() {
        // テスト項目: 次の質問の後に届いた前の質問の時間切れは無視される
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.question_received(question(2, &[1, 2]));

        // when (操作):
        let effects = machine.timer_expired(QuestionId::new(1));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert!(machine.record(QuestionId::new(1)).is_none());
        assert_eq!(machine.countdown(), MAX_DURATION);
    }

    #[test]
    fn test_expiry_then_next_question_keeps_dispatched_submission() {
        // テスト項目: 時間切れの直後に次の質問が来ても、送信済みの空回答は取り消されず重複もしない
        // given (前提条件):
        let mut machine = create_active_machine();
        let expiry_effects = machine.timer_expired(QuestionId::new(1));

        // when (操作):
        let next_effects = machine.question_received(question(2, &[1, 2]));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::TimedOut);

        // then (期待する結果):
        assert_eq!(submits(&expiry_effects).len(), 1);
        assert!(submits(&next_effects).is_empty());
        assert_eq!(machine.state(), SessionState::QuestionActive);
        assert_eq!(
            machine.record(QuestionId::new(1)).unwrap().outcome(),
            AnswerOutcome::TimedOut
        );
    }

    #[test]
    fn test_repeated_question_is_ignored() {
        // テスト項目: 既に出題された質問 ID の再送は無視されカウントダウンもリセットされない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Correct);
        machine.timer_tick(QuestionId::new(1), 4);

        // when (操作):
        let effects = machine.question_received(question(1, &[3, 4, 5]));

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(machine.state(), SessionState::AwaitingNextQuestionOrEnd);
        assert_eq!(machine.countdown(), 4);
    }

    #[test]
    fn test_tick_for_previous_question_does_not_change_countdown() {
        // テスト項目: 前の質問のティックは現在のカウントダウンを変えない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.question_received(question(2, &[1, 2]));

        // when (操作):
        machine.timer_tick(QuestionId::new(1), 3);

        // then (期待する結果):
        assert_eq!(machine.countdown(), MAX_DURATION);
    }

    #[test]
    fn test_scenario_e_rank_finishes_session_once() {
        // テスト項目: シナリオ E - 順位受信で Finished になりチャンネルが閉じ、後続の順位は無視される
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Correct);

        // when (操作):
        let effects = machine.rank_received(RankResult {
            username: "alice".to_string(),
            rank: 3,
        });
        let later = machine.rank_received(RankResult {
            username: "alice".to_string(),
            rank: 1,
        });

        // then (期待する結果):
        assert_eq!(effects, vec![Effect::StopTimer, Effect::CloseChannel]);
        assert!(later.is_empty());
        assert_eq!(machine.state(), SessionState::Finished);
        assert_eq!(
            machine.rank(),
            Some(&RankResult {
                username: "alice".to_string(),
                rank: 3,
            })
        );
        assert_eq!(machine.snapshot().connection, ConnectionState::Disconnected);
    }

    #[test]
    fn test_channel_error_after_finish_is_ignored() {
        // テスト項目: 終了後のチャンネル切断は Failed にしない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.rank_received(RankResult {
            username: "alice".to_string(),
            rank: 1,
        });

        // when (操作):
        let effects = machine.channel_failed("stream ended");

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(machine.state(), SessionState::Finished);
    }

    #[test]
    fn test_channel_error_mid_quiz_fails_session() {
        // テスト項目: 出題中のチャンネル切断で Failed になりタイマーとチャンネルが止まる
        // given (前提条件):
        let mut machine = create_active_machine();

        // when (操作):
        let effects = machine.channel_failed("stream ended");

        // then (期待する結果):
        assert_eq!(machine.state(), SessionState::Failed);
        assert_eq!(effects, vec![Effect::StopTimer, Effect::CloseChannel]);
        assert_eq!(
            machine.snapshot().error.as_deref(),
            Some("cannot continue: stream ended")
        );
    }

    #[test]
    fn test_outcome_after_leave_does_not_resurrect_session() {
        // テスト項目: 退出後に届いた送信結果はセッション状態を変更しない
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));
        let effects = machine.leave();

        // when (操作):
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Correct);

        // then (期待する結果):
        assert_eq!(effects, vec![Effect::StopTimer, Effect::CloseChannel]);
        assert_eq!(machine.score(), 0);
        assert_eq!(machine.state(), SessionState::QuestionActive);
        assert_eq!(
            machine.record(QuestionId::new(1)).unwrap().outcome(),
            AnswerOutcome::Pending
        );
        assert!(machine.question_received(question(2, &[1])).is_empty());
    }

    #[test]
    fn test_failed_submission_does_not_block_progress() {
        // テスト項目: 送信失敗は Failed として記録され、次の質問に進める
        // given (前提条件):
        let mut machine = create_active_machine();
        machine.select_option(OptionToken::new(4));

        // when (操作):
        machine.submission_resolved(QuestionId::new(1), AnswerOutcome::Failed);
        let effects = machine.question_received(question(2, &[1, 2]));

        // then (期待する結果):
        assert_eq!(
            machine.record(QuestionId::new(1)).unwrap().outcome(),
            AnswerOutcome::Failed
        );
        assert_eq!(effects.len(), 1);
        assert_eq!(machine.state(), SessionState::QuestionActive);
    }
}
