//! Server-sent event stream of a quiz participant.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use tokio::sync::mpsc;

use quizcast_shared::dto::SubscribeQuery;

use crate::{domain::ServerEvent, ui::state::AppState, usecase::SubscribeError};

/// Subscribe to a live quiz
///
/// The stream starts with the subscription acknowledgment and then carries
/// the questions and the final rank. Dropping the stream closes the sender
/// held by the pusher, which frees the username.
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let Ok(quiz_id) = query.quiz_id.trim().parse::<i64>() else {
        tracing::warn!("Invalid quiz id: '{}'", query.quiz_id);
        return Err(StatusCode::NOT_FOUND);
    };

    let (tx, rx) = mpsc::unbounded_channel();
    match state
        .subscribe_usecase
        .execute(quiz_id, &query.pin, &query.username, tx)
        .await
    {
        Ok(()) => Ok(Sse::new(event_stream(rx)).keep_alive(KeepAlive::default())),
        Err(e) => {
            tracing::warn!("Subscription of '{}' rejected: {}", query.username, e);
            Err(status_of(&e))
        }
    }
}

fn status_of(error: &SubscribeError) -> StatusCode {
    match error {
        SubscribeError::EmptyUsername => StatusCode::BAD_REQUEST,
        SubscribeError::QuizNotOpen(_) => StatusCode::NOT_FOUND,
        SubscribeError::InvalidPin(_) => StatusCode::FORBIDDEN,
        SubscribeError::DuplicateUsername(_) => StatusCode::CONFLICT,
        SubscribeError::AckFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns pushed events into SSE frames until the pusher lets go of the sender
fn event_stream(
    rx: mpsc::UnboundedReceiver<ServerEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let frame = Event::default().event(event.name).data(event.data);
        Some((Ok(frame), rx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_subscribe_errors_map_to_status_codes() {
        // テスト項目: 購読エラーごとに対応する HTTP ステータスが返る
        // given (前提条件):
        let cases = [
            (SubscribeError::EmptyUsername, StatusCode::BAD_REQUEST),
            (SubscribeError::QuizNotOpen(1), StatusCode::NOT_FOUND),
            (SubscribeError::InvalidPin(1), StatusCode::FORBIDDEN),
            (
                SubscribeError::DuplicateUsername("alice".to_string()),
                StatusCode::CONFLICT,
            ),
        ];

        for (error, expected) in cases {
            // when (操作):
            let status = status_of(&error);

            // then (期待する結果):
            assert_eq!(status, expected, "{error}");
        }
    }

    #[tokio::test]
    async fn test_event_stream_ends_when_sender_dropped() {
        // テスト項目: 送信側が閉じるとイベントストリームも終わる
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ServerEvent::text("question", "hello")).unwrap();
        drop(tx);

        // when (操作):
        let frames: Vec<_> = event_stream(rx).collect().await;

        // then (期待する結果):
        assert_eq!(frames.len(), 1);
    }
}
