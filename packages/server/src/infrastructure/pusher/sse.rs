//! Server-Sent Events を使った EventPusher 実装
//!
//! ## 責務
//!
//! - 購読者ごとの `UnboundedSender` を管理（同名の重複は登録時に拒否）
//! - 購読者へのイベント送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! SSE ストリームの生成は UI 層（`ui/handler/sse.rs`）で行われます。
//! この実装は生成された sender を受け取り、イベント送信に使用します。
//! ストリームが閉じた購読者は、送信に失敗した時点で登録から外します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{EventPushError, EventPusher, PusherChannel, ServerEvent};

type Subscribers = HashMap<i64, HashMap<String, PusherChannel>>;

/// SSE を使った EventPusher 実装
///
/// Key: quiz_id → username
pub struct SseEventPusher {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl SseEventPusher {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for SseEventPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPusher for SseEventPusher {
    async fn register(
        &self,
        quiz_id: i64,
        username: &str,
        channel: PusherChannel,
    ) -> Result<(), EventPushError> {
        let mut subscribers = self.subscribers.lock().await;
        let quiz = subscribers.entry(quiz_id).or_default();
        if quiz.get(username).is_some_and(|open| !open.is_closed()) {
            return Err(EventPushError::AlreadySubscribed(username.to_string()));
        }
        quiz.insert(username.to_string(), channel);
        tracing::debug!("Subscriber '{}' registered to quiz {}", username, quiz_id);
        Ok(())
    }

    async fn unregister(&self, quiz_id: i64, username: &str) {
        let mut subscribers = self.subscribers.lock().await;
        if let Some(quiz) = subscribers.get_mut(&quiz_id) {
            quiz.remove(username);
        }
        tracing::debug!("Subscriber '{}' unregistered from quiz {}", username, quiz_id);
    }

    async fn subscribers(&self, quiz_id: i64) -> Vec<String> {
        let subscribers = self.subscribers.lock().await;
        let mut usernames: Vec<String> = subscribers
            .get(&quiz_id)
            .map(|quiz| quiz.keys().cloned().collect())
            .unwrap_or_default();
        usernames.sort();
        usernames
    }

    async fn push_to(
        &self,
        quiz_id: i64,
        username: &str,
        event: ServerEvent,
    ) -> Result<(), EventPushError> {
        let mut subscribers = self.subscribers.lock().await;
        let quiz = subscribers
            .get_mut(&quiz_id)
            .ok_or_else(|| EventPushError::SubscriberNotFound(username.to_string()))?;
        let channel = quiz
            .get(username)
            .ok_or_else(|| EventPushError::SubscriberNotFound(username.to_string()))?;

        if let Err(e) = channel.send(event) {
            quiz.remove(username);
            tracing::warn!("Dropped subscriber '{}' of quiz {}: stream closed", username, quiz_id);
            return Err(EventPushError::PushFailed(e.to_string()));
        }
        tracing::debug!("Pushed event to '{}' of quiz {}", username, quiz_id);
        Ok(())
    }

    async fn broadcast(&self, quiz_id: i64, event: ServerEvent) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        let Some(quiz) = subscribers.get_mut(&quiz_id) else {
            return 0;
        };

        let before = quiz.len();
        // 送信に失敗した（ストリームが閉じた）購読者は外す
        quiz.retain(|username, channel| match channel.send(event.clone()) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!("Dropped subscriber '{}' of quiz {}: stream closed", username, quiz_id);
                false
            }
        });
        let delivered = quiz.len();
        tracing::debug!(
            "Broadcast '{}' to {}/{} subscribers of quiz {}",
            event.name,
            delivered,
            before,
            quiz_id
        );
        delivered
    }
}
