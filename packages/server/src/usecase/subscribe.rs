//! UseCase: 参加者の購読処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubscribeUseCase::execute() メソッド
//! - PIN の照合、ユーザー名の重複チェック、購読完了メッセージの送信
//!
//! ### なぜこのテストが必要か
//! - 参加者は購読完了メッセージを受け取るまで参加できたか分からない
//! - 同じユーザー名で 2 つのストリームが開くとランキングが崩れる
//!
//! ### どのような状況を想定しているか
//! - 正常系：購読して完了メッセージを受け取る
//! - 異常系：公開されていないクイズ、PIN 違い、ユーザー名の重複、空のユーザー名
//! - エッジケース：切断済みのユーザー名での再購読、同じユーザー名の同時購読

use std::sync::Arc;

use quizcast_shared::dto::{QUESTION_EVENT, subscribe_ack};

use crate::domain::{EventPusher, PusherChannel, QuizRepository, ServerEvent};

use super::error::SubscribeError;

/// 参加者購読のユースケース
pub struct SubscribeUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn QuizRepository>,
    /// EventPusher（イベント通知の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl SubscribeUseCase {
    /// 新しい SubscribeUseCase を作成
    pub fn new(repository: Arc<dyn QuizRepository>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { repository, pusher }
    }

    /// 購読を実行
    ///
    /// # Arguments
    ///
    /// * `quiz_id` - 参加するクイズの ID
    /// * `pin` - クイズの PIN
    /// * `username` - 参加者のユーザー名
    /// * `channel` - 参加者へのイベント送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 購読成功（購読完了メッセージは送信済み）
    /// * `Err(SubscribeError)` - 購読失敗
    pub async fn execute(
        &self,
        quiz_id: i64,
        pin: &str,
        username: &str,
        channel: PusherChannel,
    ) -> Result<(), SubscribeError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SubscribeError::EmptyUsername);
        }

        // 1. 公開中のクイズと PIN の確認
        let live = self
            .repository
            .find_live(quiz_id)
            .await
            .ok_or(SubscribeError::QuizNotOpen(quiz_id))?;
        if !live.pin.matches(pin) {
            return Err(SubscribeError::InvalidPin(quiz_id));
        }

        // 2. 購読者の登録（重複チェックを含む。ストリームが閉じたユーザー名は再利用できる）
        self.pusher
            .register(quiz_id, username, channel)
            .await
            .map_err(|_| SubscribeError::DuplicateUsername(username.to_string()))?;

        // 3. スコアボードへの追加
        if self
            .repository
            .add_participant(quiz_id, username)
            .await
            .is_err()
        {
            self.pusher.unregister(quiz_id, username).await;
            return Err(SubscribeError::QuizNotOpen(quiz_id));
        }

        // 4. 購読完了メッセージ
        let ack = ServerEvent::text(QUESTION_EVENT, subscribe_ack(username));
        if let Err(e) = self.pusher.push_to(quiz_id, username, ack).await {
            self.pusher.unregister(quiz_id, username).await;
            return Err(SubscribeError::AckFailed(e.to_string()));
        }

        tracing::info!("'{}' subscribed to quiz {}", username, quiz_id);
        Ok(())
    }
}
