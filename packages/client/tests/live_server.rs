//! End-to-end runs against an in-process quiz host.

use std::{sync::Arc, time::Duration};

use tokio::{net::TcpListener, sync::oneshot};

use quizcast_client::{
    ClientConfig, ClientError, QuizSession, UserCommand,
    domain::{ConnectionState, OptionToken, QuestionId, RankResult, SessionSnapshot, SessionState},
    infrastructure::{HttpAnswerApi, SseConnector},
};
use quizcast_server::{Server, ServerConfig};
use quizcast_shared::{dto::OpenQuizResponse, time::SystemClock};

const QUESTION_INTERVAL: Duration = Duration::from_millis(500);
const WAIT: Duration = Duration::from_secs(10);

/// A host serving the demo quiz on an ephemeral port
struct Host {
    base_url: String,
    http: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
}

impl Host {
    async fn start() -> Self {
        let config = ServerConfig {
            question_interval: QUESTION_INTERVAL,
            ..ServerConfig::default()
        };
        let server = Server::from_config(&config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(server.serve(listener, async {
            let _ = stopped.await;
        }));

        Self {
            base_url,
            http: reqwest::Client::new(),
            stop: Some(stop),
        }
    }

    async fn open(&self, quiz_id: i64) -> String {
        let response: OpenQuizResponse = self
            .http
            .post(format!("{}/api/quiz/{}/open", self.base_url, quiz_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        response.pin
    }

    async fn start_quiz(&self, quiz_id: i64) -> reqwest::StatusCode {
        self.http
            .post(format!("{}/api/quiz/{}/start", self.base_url, quiz_id))
            .send()
            .await
            .unwrap()
            .status()
    }

    fn session(
        &self,
    ) -> (
        QuizSession,
        tokio::sync::watch::Receiver<SessionSnapshot>,
    ) {
        let config = ClientConfig::new(&self.base_url)
            .with_max_duration(5)
            .with_tick_interval(Duration::from_millis(100));
        let http = reqwest::Client::new();
        QuizSession::new(
            config,
            Arc::new(SseConnector::new(http.clone(), &self.base_url)),
            Arc::new(HttpAnswerApi::new(http, &self.base_url)),
            Arc::new(SystemClock),
        )
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

#[tokio::test]
async fn test_full_quiz_against_host() {
    // テスト項目: 実サーバーに参加し、1 問目に正解して最後に順位を受け取る
    // given (前提条件):
    let host = Host::start().await;
    let pin = host.open(1).await;
    let (session, mut snapshots) = host.session();
    let (commands, commands_rx) = tokio::sync::mpsc::unbounded_channel();
    let running =
        tokio::spawn(async move { session.run("1", &pin, "alice", commands_rx).await });
    tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| s.connection == ConnectionState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    // when (操作):
    assert_eq!(host.start_quiz(1).await, reqwest::StatusCode::ACCEPTED);
    tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| {
            s.question
                .as_ref()
                .is_some_and(|q| q.id == QuestionId::new(1))
        }),
    )
    .await
    .unwrap()
    .unwrap();
    // デモのクイズの 1 問目は 2 番が正解
    commands.send(UserCommand::Select(OptionToken::new(2))).unwrap();
    let result = tokio::time::timeout(WAIT, running).await.unwrap().unwrap();

    // then (期待する結果):
    let snapshot = result.unwrap();
    assert_eq!(snapshot.state, SessionState::Finished);
    assert_eq!(snapshot.score, 1);
    assert_eq!(
        snapshot.rank,
        Some(RankResult {
            username: "alice".to_string(),
            rank: 1,
        })
    );
}

#[tokio::test]
async fn test_wrong_pin_is_refused() {
    // テスト項目: PIN が違うと参加できずセッションは失敗で終わる
    // given (前提条件):
    let host = Host::start().await;
    let pin = host.open(1).await;
    let wrong_pin = if pin == "1000" { "1001" } else { "1000" };
    let (session, _snapshots) = host.session();
    let (_commands, commands_rx) = tokio::sync::mpsc::unbounded_channel();

    // when (操作):
    let result = tokio::time::timeout(WAIT, session.run("1", wrong_pin, "alice", commands_rx))
        .await
        .unwrap();

    // then (期待する結果):
    match result {
        Err(ClientError::ConnectionError(reason)) => assert!(reason.contains("403"), "{reason}"),
        other => panic!("expected a refused join, got {other:?}"),
    }
}
