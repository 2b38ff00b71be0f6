//! Push channel client.
//!
//! Opens one subscription per join, decodes the named events and forwards
//! them, in server send order, to the session driver over a bounded channel.
//! Malformed payloads are reported and skipped. A transport failure or the
//! end of the stream is reported once and ends delivery; reconnecting is not
//! this component's call.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::{sync::mpsc, task::JoinHandle};

use quizcast_shared::dto::{
    QUESTION_EVENT, QuestionPayload, SUBSCRIBE_COMPLETE_MARKER, USER_RANK_EVENT, UserRankPayload,
};

use crate::{
    domain::{JoinRequest, PushConnector, PushEvent, RawEvent},
    error::{ClientError, ParseError},
};

/// What the channel reports to the session driver
#[derive(Debug)]
pub enum ChannelEvent {
    /// The subscription was accepted
    Opened,
    /// A decoded event
    Event(PushEvent),
    /// An event was dropped because its payload was malformed
    Malformed(ParseError),
    /// The channel failed or was closed by the server; nothing follows
    Failed(String),
}

/// Handle to an open push subscription
pub struct PushChannel {
    task: Option<JoinHandle<()>>,
}

impl PushChannel {
    /// Open a subscription for `request`
    ///
    /// Returns the handle and the receiver of channel events. The first event
    /// is either [`ChannelEvent::Opened`] or [`ChannelEvent::Failed`].
    #[must_use = "the event receiver must be used to receive events"]
    pub fn open(
        connector: Arc<dyn PushConnector>,
        request: JoinRequest,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ChannelEvent>) {
        // tokio panics on a zero capacity
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(channel_loop(connector, request, tx));
        (Self { task: Some(task) }, rx)
    }

    /// Stop delivering events and drop the subscription
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Push channel closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.close();
    }
}

async fn channel_loop(
    connector: Arc<dyn PushConnector>,
    request: JoinRequest,
    tx: mpsc::Sender<ChannelEvent>,
) {
    let mut transport = match connector.connect(&request).await {
        Ok(transport) => transport,
        Err(e) => {
            tracing::warn!("Failed to open push channel: {}", e);
            let _ = tx.send(ChannelEvent::Failed(failure_reason(e))).await;
            return;
        }
    };

    tracing::info!("Push channel opened for '{}'", request.username);
    if tx.send(ChannelEvent::Opened).await.is_err() {
        return;
    }

    loop {
        let event = match transport.next_event().await {
            Some(Ok(raw)) => match decode_event(&raw) {
                Ok(Some(event)) => ChannelEvent::Event(event),
                Ok(None) => {
                    tracing::debug!("Subscription acknowledged: {}", raw.data);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Dropping malformed event: {}", e);
                    ChannelEvent::Malformed(e)
                }
            },
            Some(Err(e)) => {
                tracing::warn!("Push channel error: {}", e);
                let _ = tx.send(ChannelEvent::Failed(failure_reason(e))).await;
                return;
            }
            None => {
                tracing::info!("Server closed the push channel");
                let _ = tx
                    .send(ChannelEvent::Failed("server closed the stream".to_string()))
                    .await;
                return;
            }
        };

        // The receiver is gone once the session is closed
        if tx.send(event).await.is_err() {
            return;
        }
    }
}

fn failure_reason(error: ClientError) -> String {
    match error {
        ClientError::ConnectionError(reason) => reason,
        other => other.to_string(),
    }
}

/// Decode a raw event
///
/// Returns `Ok(None)` for the subscription acknowledgment, which carries no
/// session information.
///
/// # Errors
///
/// Returns [`ParseError`] for non-JSON data, missing fields or an event name
/// the client does not handle.
pub fn decode_event(raw: &RawEvent) -> Result<Option<PushEvent>, ParseError> {
    match raw.name.as_str() {
        QUESTION_EVENT => {
            if is_subscribe_ack(&raw.data) {
                return Ok(None);
            }
            let payload: QuestionPayload = parse_payload(raw)?;
            Ok(Some(PushEvent::Question(payload.into())))
        }
        USER_RANK_EVENT => {
            let payload: UserRankPayload = parse_payload(raw)?;
            Ok(Some(PushEvent::UserRank(payload.into())))
        }
        other => Err(ParseError::UnknownEvent(other.to_string())),
    }
}

/// The acknowledgment arrives either as bare text or as a JSON string
fn is_subscribe_ack(data: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(serde_json::Value::String(text)) => text.contains(SUBSCRIBE_COMPLETE_MARKER),
        Ok(_) => false,
        Err(_) => data.contains(SUBSCRIBE_COMPLETE_MARKER),
    }
}

fn parse_payload<T: DeserializeOwned>(raw: &RawEvent) -> Result<T, ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(&raw.data).map_err(|source| ParseError::InvalidJson {
            event: raw.name.clone(),
            source,
        })?;
    serde_json::from_value(value).map_err(|source| ParseError::MissingFields {
        event: raw.name.clone(),
        source,
    })
}
