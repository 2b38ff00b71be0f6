//! UseCase: 出題と順位通知
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RunQuizUseCase::start() / run() メソッド
//! - 問題を順番に一定間隔で配信し、最後に各参加者へ順位を送る流れ
//!
//! ### なぜこのテストが必要か
//! - 参加者のセッションは user-rank を受け取るまで終わらない
//! - 出題が二重に始まると同じ問題が 2 回届く
//!
//! ### どのような状況を想定しているか
//! - 正常系：全問配信のあと順位が届く
//! - 異常系：公開されていないクイズ、二重開始
//! - エッジケース：正解者がいない参加者も 0 点で順位がつく

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use quizcast_shared::dto::{QUESTION_EVENT, USER_RANK_EVENT, UserRankPayload};

use crate::domain::{EventPusher, Quiz, QuizRepository, RepositoryError, ServerEvent};

use super::error::RunQuizError;

/// 出題のユースケース
pub struct RunQuizUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn QuizRepository>,
    /// EventPusher（イベント通知の抽象化）
    pusher: Arc<dyn EventPusher>,
    /// 問題と問題の間隔（回答時間）
    question_interval: Duration,
}

impl RunQuizUseCase {
    /// 新しい RunQuizUseCase を作成
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        pusher: Arc<dyn EventPusher>,
        question_interval: Duration,
    ) -> Self {
        Self {
            repository,
            pusher,
            question_interval,
        }
    }

    /// 出題を開始する
    ///
    /// 開始を記録したあと、出題はバックグラウンドのタスクで進む。
    ///
    /// # Returns
    ///
    /// * `Ok(JoinHandle)` - 出題タスク
    /// * `Err(RunQuizError)` - 公開されていない、または開始済み
    pub async fn start(&self, quiz_id: i64) -> Result<JoinHandle<()>, RunQuizError> {
        let quiz = self
            .repository
            .find_quiz(quiz_id)
            .await
            .ok_or(RunQuizError::QuizNotOpen(quiz_id))?;
        self.repository
            .mark_started(quiz_id)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyStarted(id) => RunQuizError::AlreadyStarted(id),
                RepositoryError::QuizNotFound(id) | RepositoryError::QuizNotOpen(id) => {
                    RunQuizError::QuizNotOpen(id)
                }
            })?;

        tracing::info!(
            "Quiz {} started: {} questions, {:?} each",
            quiz_id,
            quiz.questions.len(),
            self.question_interval
        );
        let repository = self.repository.clone();
        let pusher = self.pusher.clone();
        let interval = self.question_interval;
        Ok(tokio::spawn(async move {
            run(repository, pusher, quiz, interval).await;
        }))
    }
}

/// 全問を配信し、最後に順位を送る
async fn run(
    repository: Arc<dyn QuizRepository>,
    pusher: Arc<dyn EventPusher>,
    quiz: Quiz,
    interval: Duration,
) {
    for question in &quiz.questions {
        match ServerEvent::json(QUESTION_EVENT, &question.to_payload()) {
            Ok(event) => {
                let delivered = pusher.broadcast(quiz.id, event).await;
                tracing::info!(
                    "Question {} of quiz {} sent to {} participants",
                    question.id,
                    quiz.id,
                    delivered
                );
            }
            Err(e) => tracing::error!("Skipping question {}: {}", question.id, e),
        }
        tokio::time::sleep(interval).await;
    }

    announce_ranks(repository.as_ref(), pusher.as_ref(), quiz.id).await;
}

/// 各購読者に順位を送り、購読を終える
async fn announce_ranks(repository: &dyn QuizRepository, pusher: &dyn EventPusher, quiz_id: i64) {
    let Some(live) = repository.find_live(quiz_id).await else {
        tracing::warn!("Quiz {} closed before ranking", quiz_id);
        return;
    };

    for username in pusher.subscribers(quiz_id).await {
        let payload = UserRankPayload {
            rank: live.scoreboard.rank_of(&username),
            username: username.clone(),
        };
        let pushed = match ServerEvent::json(USER_RANK_EVENT, &payload) {
            Ok(event) => pusher.push_to(quiz_id, &username, event).await,
            Err(e) => Err(e),
        };
        match pushed {
            Ok(()) => tracing::info!("'{}' ranked {} in quiz {}", username, payload.rank, quiz_id),
            Err(e) => tracing::warn!("Rank for '{}' not delivered: {}", username, e),
        }
        pusher.unregister(quiz_id, &username).await;
    }
}
