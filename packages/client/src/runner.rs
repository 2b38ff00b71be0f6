//! Session driver.
//!
//! Owns the state machine and every resource it controls (push channel,
//! countdown, in-flight submissions) and feeds them through a single
//! `select!` loop, so no two inputs are ever handled concurrently. After each
//! input the requested effects are carried out and a fresh snapshot is
//! published for the UI.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinSet},
};

use quizcast_shared::time::Clock;

use crate::{
    channel::{ChannelEvent, PushChannel},
    config::ClientConfig,
    domain::{
        AnswerApi, Effect, OptionToken, PushConnector, QuestionId, Resolution, SessionSnapshot,
        SessionState, SessionStateMachine,
    },
    error::ClientError,
    submitter::AnswerSubmitter,
    timer::{CountdownTimer, TimerEvent},
};

/// Input from the participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Select(OptionToken),
    /// Navigate away from the session
    Leave,
}

enum Input {
    Channel(Option<ChannelEvent>),
    Timer(TimerEvent),
    Submission(Result<(QuestionId, Resolution), JoinError>),
    Command(Option<UserCommand>),
}

pub struct QuizSession {
    config: ClientConfig,
    connector: Arc<dyn PushConnector>,
    submitter: AnswerSubmitter,
    machine: SessionStateMachine,
    timer: CountdownTimer,
    /// Question the running countdown belongs to
    timed_question: Option<QuestionId>,
    channel: Option<PushChannel>,
    events: Option<mpsc::Receiver<ChannelEvent>>,
    submissions: JoinSet<(QuestionId, Resolution)>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl QuizSession {
    /// Create an idle session and the receiver its snapshots are published on
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn PushConnector>,
        api: Arc<dyn AnswerApi>,
        clock: Arc<dyn Clock>,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let machine = SessionStateMachine::new(config.max_duration, clock);
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

        let session = Self {
            submitter: AnswerSubmitter::new(api, config.ambiguous_policy),
            timer: CountdownTimer::new(config.tick_interval),
            config,
            connector,
            machine,
            timed_question: None,
            channel: None,
            events: None,
            submissions: JoinSet::new(),
            snapshot_tx,
        };
        (session, snapshot_rx)
    }

    /// Join and drive the session until it finishes, fails or is left
    ///
    /// Returns the final snapshot.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Validation`] when a join field is blank
    /// * [`ClientError::ConnectionError`] when the session failed
    pub async fn run(
        mut self,
        quiz_id: &str,
        pin: &str,
        username: &str,
        mut commands: mpsc::UnboundedReceiver<UserCommand>,
    ) -> Result<SessionSnapshot, ClientError> {
        let effects = self.machine.submit_join(quiz_id, pin, username)?;
        self.apply(effects);
        self.publish();

        let mut commands_open = true;
        while !self.machine.is_closed() {
            let input = tokio::select! {
                event = next_channel_event(&mut self.events) => Input::Channel(event),
                event = self.timer.next_event() => Input::Timer(event),
                Some(joined) = self.submissions.join_next(), if !self.submissions.is_empty() => {
                    Input::Submission(joined)
                }
                command = commands.recv(), if commands_open => Input::Command(command),
            };

            let effects = match input {
                Input::Channel(event) => self.on_channel_event(event),
                Input::Timer(event) => self.on_timer_event(event),
                Input::Submission(joined) => self.on_submission(joined),
                Input::Command(Some(UserCommand::Select(option))) => {
                    self.machine.select_option(option)
                }
                Input::Command(Some(UserCommand::Leave)) => self.machine.leave(),
                Input::Command(None) => {
                    tracing::debug!("Command source closed");
                    commands_open = false;
                    Vec::new()
                }
            };
            self.apply(effects);
            self.publish();
        }

        if !self.submissions.is_empty() {
            tracing::debug!(
                "Detaching {} in-flight submission(s)",
                self.submissions.len()
            );
        }
        self.submissions.detach_all();

        let snapshot = self.machine.snapshot();
        tracing::info!(
            "Session ended in state '{}' with score {}",
            snapshot.state,
            snapshot.score
        );
        match snapshot.state {
            SessionState::Failed => Err(ClientError::ConnectionError(
                snapshot.error.unwrap_or_else(|| "session failed".to_string()),
            )),
            _ => Ok(snapshot),
        }
    }

    fn on_channel_event(&mut self, event: Option<ChannelEvent>) -> Vec<Effect> {
        match event {
            Some(ChannelEvent::Opened) => self.machine.channel_opened(),
            Some(ChannelEvent::Event(event)) => self.machine.push_event(event),
            Some(ChannelEvent::Malformed(_)) => Vec::new(),
            Some(ChannelEvent::Failed(reason)) => self.machine.channel_failed(&reason),
            None => {
                self.events = None;
                self.machine.channel_failed("push channel ended")
            }
        }
    }

    fn on_timer_event(&mut self, event: TimerEvent) -> Vec<Effect> {
        let Some(question_id) = self.timed_question else {
            return Vec::new();
        };
        match event {
            TimerEvent::Tick { remaining } => self.machine.timer_tick(question_id, remaining),
            TimerEvent::Expired => self.machine.timer_expired(question_id),
        }
    }

    fn on_submission(
        &mut self,
        joined: Result<(QuestionId, Resolution), JoinError>,
    ) -> Vec<Effect> {
        match joined {
            Ok((question_id, resolution)) => {
                self.machine.submission_resolved(question_id, resolution)
            }
            Err(e) => {
                tracing::error!("Submission task did not complete: {}", e);
                Vec::new()
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenChannel(request) => {
                    let (channel, events) = PushChannel::open(
                        Arc::clone(&self.connector),
                        request,
                        self.config.event_capacity,
                    );
                    self.channel = Some(channel);
                    self.events = Some(events);
                }
                Effect::CloseChannel => {
                    if let Some(mut channel) = self.channel.take() {
                        channel.close();
                    }
                    self.events = None;
                }
                Effect::ResetTimer {
                    question_id,
                    duration_secs,
                } => {
                    self.timed_question = Some(question_id);
                    self.timer.reset(duration_secs);
                }
                Effect::StopTimer => {
                    self.timer.stop();
                    self.timed_question = None;
                }
                Effect::Submit(request) => {
                    let submitter = self.submitter.clone();
                    self.submissions.spawn(async move {
                        let resolution = submitter.submit(&request).await;
                        (request.question_id, resolution)
                    });
                }
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

async fn next_channel_event(
    events: &mut Option<mpsc::Receiver<ChannelEvent>>,
) -> Option<ChannelEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
