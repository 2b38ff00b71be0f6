//! EventPusher trait 定義
//!
//! 参加者へのイベント送信（SSE など）のインターフェース。
//! 具体的な実装は Infrastructure 層が提供します。

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use super::EventPushError;

/// A named event for one subscriber stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub name: String,
    pub data: String,
}

impl ServerEvent {
    pub fn text(name: &str, data: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Event whose data is `value` as JSON
    ///
    /// # Errors
    ///
    /// Returns [`EventPushError::Encode`] if `value` cannot be serialized.
    pub fn json<T: Serialize>(name: &str, value: &T) -> Result<Self, EventPushError> {
        let data =
            serde_json::to_string(value).map_err(|e| EventPushError::Encode(e.to_string()))?;
        Ok(Self::text(name, data))
    }
}

/// Sending half of one subscriber's event stream
pub type PusherChannel = mpsc::UnboundedSender<ServerEvent>;

/// Pushes events to the subscribers of live quizzes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// 購読者を登録
    ///
    /// 重複の確認と登録は同じロックの中で行う。ストリームが閉じた登録は置き換える。
    ///
    /// # Errors
    ///
    /// 同じユーザー名のストリームが開いていれば [`EventPushError::AlreadySubscribed`]。
    async fn register(
        &self,
        quiz_id: i64,
        username: &str,
        channel: PusherChannel,
    ) -> Result<(), EventPushError>;

    /// 購読者を削除
    async fn unregister(&self, quiz_id: i64, username: &str);

    /// 購読者のユーザー名一覧（ソート済み）
    async fn subscribers(&self, quiz_id: i64) -> Vec<String>;

    /// 特定の購読者に送信
    ///
    /// 送信に失敗した購読者は登録から外れる。
    async fn push_to(
        &self,
        quiz_id: i64,
        username: &str,
        event: ServerEvent,
    ) -> Result<(), EventPushError>;

    /// クイズの全購読者に送信し、届いた数を返す
    ///
    /// 送信に失敗した購読者は登録から外れる。
    async fn broadcast(&self, quiz_id: i64, event: ServerEvent) -> usize;
}
