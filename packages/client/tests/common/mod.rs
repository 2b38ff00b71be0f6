//! Scripted collaborators for driving a session without a server.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use quizcast_client::{
    ClientConfig, QuizSession, UserCommand,
    domain::{
        AnswerApi, JoinRequest, PushConnector, PushTransport, RawEvent, SessionSnapshot,
        SubmitRequest,
    },
    error::{ClientError, SubmissionError},
};
use quizcast_shared::time::FixedClock;

pub const NOW: i64 = 1672498800000;
pub const MAX_DURATION: u32 = 10;

type Script = mpsc::UnboundedReceiver<Result<RawEvent, ClientError>>;

/// Transport whose events are pushed by the test
struct ScriptTransport {
    events: Script,
}

#[async_trait]
impl PushTransport for ScriptTransport {
    async fn next_event(&mut self) -> Option<Result<RawEvent, ClientError>> {
        self.events.recv().await
    }
}

/// Connector handing out one scripted transport
pub struct ScriptConnector {
    script: Mutex<Option<Script>>,
    refusal: Option<String>,
    joins: Mutex<Vec<JoinRequest>>,
}

impl ScriptConnector {
    /// Returns the connector and the sender the test pushes events with
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<RawEvent, ClientError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            script: Mutex::new(Some(rx)),
            refusal: None,
            joins: Mutex::new(Vec::new()),
        };
        (Arc::new(connector), tx)
    }

    pub fn refusing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(None),
            refusal: Some(reason.to_string()),
            joins: Mutex::new(Vec::new()),
        })
    }

    pub fn joins(&self) -> Vec<JoinRequest> {
        self.joins.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushConnector for ScriptConnector {
    async fn connect(&self, request: &JoinRequest) -> Result<Box<dyn PushTransport>, ClientError> {
        self.joins.lock().unwrap().push(request.clone());
        if let Some(reason) = &self.refusal {
            return Err(ClientError::ConnectionError(reason.clone()));
        }
        let events = self
            .script
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClientError::ConnectionError("connector already used".to_string()))?;
        Ok(Box::new(ScriptTransport { events }))
    }
}

/// Answer endpoint with a fixed verdict per question
///
/// A question can be held until the test releases it.
pub struct ScriptAnswerApi {
    verdicts: HashMap<i64, Result<String, SubmissionError>>,
    holds: Mutex<HashMap<i64, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<SubmitRequest>>,
}

impl ScriptAnswerApi {
    pub fn new(verdicts: &[(i64, Result<&str, SubmissionError>)]) -> Self {
        Self {
            verdicts: verdicts
                .iter()
                .map(|(id, verdict)| (*id, verdict.clone().map(str::to_string)))
                .collect(),
            holds: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold the response for `question_id` until the returned sender fires
    pub fn hold(&self, question_id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert(question_id, rx);
        tx
    }

    pub fn calls(&self) -> Vec<SubmitRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerApi for ScriptAnswerApi {
    async fn submit(&self, request: &SubmitRequest) -> Result<String, SubmissionError> {
        self.calls.lock().unwrap().push(request.clone());
        let id = request.question_id.value();

        let hold = self.holds.lock().unwrap().remove(&id);
        if let Some(hold) = hold {
            let _ = hold.await;
        }

        self.verdicts
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Ok("Incorrect".to_string()))
    }
}

pub fn question(id: i64, prompt: &str, answers: &[i64]) -> Result<RawEvent, ClientError> {
    let data = serde_json::json!({ "id": id, "question": prompt, "answers": answers });
    Ok(RawEvent::new("question", data.to_string()))
}

pub fn user_rank(username: &str, rank: i64) -> Result<RawEvent, ClientError> {
    let data = serde_json::json!({ "username": username, "rank": rank });
    Ok(RawEvent::new("user-rank", data.to_string()))
}

pub fn ack(username: &str) -> Result<RawEvent, ClientError> {
    Ok(RawEvent::new(
        "question",
        format!("subscribe complete, username: {}", username),
    ))
}

/// A running session and the handles to steer it
pub struct Harness {
    pub snapshots: watch::Receiver<SessionSnapshot>,
    pub commands: mpsc::UnboundedSender<UserCommand>,
    pub session: tokio::task::JoinHandle<Result<SessionSnapshot, ClientError>>,
}

impl Harness {
    pub fn start(
        connector: Arc<dyn PushConnector>,
        api: Arc<dyn AnswerApi>,
        quiz_id: &str,
        pin: &str,
        username: &str,
    ) -> Self {
        let config = ClientConfig::default().with_max_duration(MAX_DURATION);
        let (session, snapshots) =
            QuizSession::new(config, connector, api, Arc::new(FixedClock::new(NOW)));
        let (commands, commands_rx) = mpsc::unbounded_channel();

        let (quiz_id, pin, username) = (quiz_id.to_string(), pin.to_string(), username.to_string());
        let session =
            tokio::spawn(async move { session.run(&quiz_id, &pin, &username, commands_rx).await });

        Self {
            snapshots,
            commands,
            session,
        }
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        tokio::time::timeout(Duration::from_secs(60), self.snapshots.wait_for(predicate))
            .await
            .expect("timed out waiting for snapshot")
            .expect("session dropped its snapshot sender")
            .clone()
    }

    pub fn send(&self, command: UserCommand) {
        self.commands.send(command).expect("session stopped listening");
    }

    pub async fn finish(self) -> Result<SessionSnapshot, ClientError> {
        tokio::time::timeout(Duration::from_secs(60), self.session)
            .await
            .expect("session did not end")
            .expect("session task panicked")
    }
}
