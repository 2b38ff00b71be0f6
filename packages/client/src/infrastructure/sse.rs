//! Server-sent events transport for the push channel.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::{StreamExt, stream::BoxStream};

use quizcast_shared::dto::SubscribeQuery;

use crate::{
    domain::{JoinRequest, PushConnector, PushTransport, RawEvent},
    error::ClientError,
};

/// Event name used when a frame has no `event:` field
const DEFAULT_EVENT: &str = "message";

/// Incremental `text/event-stream` decoder
///
/// Chunks may split lines and UTF-8 sequences anywhere; bytes are buffered
/// until a full line is available. Lines end with `\r\n`, `\n` or a bare `\r`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// The previous chunk ended on `\r`, so a leading `\n` belongs to it
    skip_lf: bool,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the events it completed, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        let chunk = match (self.skip_lf, chunk.split_first()) {
            (true, Some((b'\n', rest))) => rest,
            _ => chunk,
        };
        self.skip_lf = false;
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..]
            .iter()
            .position(|byte| matches!(byte, b'\r' | b'\n'))
        {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.buffer[start..end]).into_owned();
            start = end + 1;
            if self.buffer[end] == b'\r' {
                match self.buffer.get(start) {
                    Some(b'\n') => start += 1,
                    Some(_) => {}
                    None => self.skip_lf = true,
                }
            }
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..start);
        events
    }

    fn process_line(&mut self, line: &str) -> Option<RawEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // comment / keep-alive
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the session uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<RawEvent> {
        let name = self
            .event
            .take()
            .unwrap_or_else(|| DEFAULT_EVENT.to_string());
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(RawEvent::new(name, data))
    }
}

/// An open event stream response
pub struct SseTransport {
    stream: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<RawEvent>,
}

impl SseTransport {
    fn new(response: reqwest::Response) -> Self {
        Self {
            stream: response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl PushTransport for SseTransport {
    async fn next_event(&mut self) -> Option<Result<RawEvent, ClientError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            match self.stream.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.push(&chunk)),
                Some(Err(e)) => return Some(Err(ClientError::ConnectionError(e.to_string()))),
                None => return None,
            }
        }
    }
}

/// Subscribes to `GET {base_url}/api/quiz/subscribe`
pub struct SseConnector {
    client: reqwest::Client,
    base_url: String,
}

impl SseConnector {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn subscribe_url(&self) -> String {
        format!("{}/api/quiz/subscribe", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PushConnector for SseConnector {
    async fn connect(&self, request: &JoinRequest) -> Result<Box<dyn PushTransport>, ClientError> {
        let query = SubscribeQuery {
            quiz_id: request.quiz_id.to_string(),
            pin: request.pin.to_string(),
            username: request.username.to_string(),
        };

        let response = self
            .client
            .get(self.subscribe_url())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .query(&query)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ConnectionError(format!(
                "subscribe rejected with status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        tracing::debug!("Subscribed to {}", self.subscribe_url());
        Ok(Box::new(SseTransport::new(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_event() {
        // テスト項目: event と data のフレームが 1 つのイベントになる
        // given (前提条件):
        let mut decoder = SseDecoder::new();

        // when (操作):
        let events = decoder.push(b"event: question\ndata: {\"id\":1}\n\n");

        // then (期待する結果):
        assert_eq!(events, vec![RawEvent::new("question", "{\"id\":1}")]);
    }

    #[test]
    fn test_decode_event_split_across_chunks() {
        // テスト項目: チャンク境界で分割されたフレームも復元される
        // given (前提条件):
        let mut decoder = SseDecoder::new();

        // when (操作):
        let first = decoder.push(b"event: user-ra");
        let second = decoder.push(b"nk\r\ndata: {\"rank\"");
        let third = decoder.push(b":1}\r\n\r\n");

        // then (期待する結果):
        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(third, vec![RawEvent::new("user-rank", "{\"rank\":1}")]);
    }

    #[test]
    fn test_decode_multiple_events_keep_order() {
        // テスト項目: 1 つのチャンク内の複数イベントが送信順に返る
        // given (前提条件):
        let mut decoder = SseDecoder::new();

        // when (操作):
        let events = decoder.push(b"event: question\ndata: a\n\nevent: question\ndata: b\n\n");

        // then (期待する結果):
        assert_eq!(
            events,
            vec![RawEvent::new("question", "a"), RawEvent::new("question", "b")]
        );
    }

    #[test]
    fn test_decode_ignores_comments_and_joins_data_lines() {
        // テスト項目: コメント行は無視され、複数の data 行は改行で結合される
        // given (前提条件):
        let mut decoder = SseDecoder::new();

        // when (操作):
        let events = decoder.push(b":\n\ndata: line1\ndata: line2\nid: 7\n\n");

        // then (期待する結果):
        assert_eq!(events, vec![RawEvent::new("message", "line1\nline2")]);
    }

    #[test]
    fn test_decode_frame_without_data_is_dropped() {
        // テスト項目: data のないフレームはイベントにならず、イベント名も持ち越されない
        // given (前提条件):
        let mut decoder = SseDecoder::new();

        // when (操作):
        let empty = decoder.push(b"event: question\n\n");
        let next = decoder.push(b"data: x\n\n");

        // then (期待する結果):
        assert!(empty.is_empty());
        assert_eq!(next, vec![RawEvent::new("message", "x")]);
    }

    #[test]
    fn test_decode_bare_carriage_return_lines() {
        // テスト項目: 行末が \r だけのストリームも \r\n がチャンク境界で分かれたストリームも同じ結果になる
        // given (前提条件):
        let mut bare = SseDecoder::new();
        let mut split = SseDecoder::new();

        // when (操作):
        let from_bare = bare.push(b"event: question\rdata: a\r\revent: question\rdata: b\r\r");
        let mut from_split = split.push(b"event: question\r");
        from_split.extend(split.push(b"\ndata: a\r"));
        from_split.extend(split.push(b"\n\r"));
        from_split.extend(split.push(b"\n"));

        // then (期待する結果):
        assert_eq!(
            from_bare,
            vec![
                RawEvent::new("question", "a"),
                RawEvent::new("question", "b"),
            ]
        );
        assert_eq!(from_split, vec![RawEvent::new("question", "a")]);
        assert!(split.buffer.is_empty());
    }

    #[test]
    fn test_subscribe_url_trims_trailing_slash() {
        // テスト項目: ベース URL 末尾のスラッシュが重複しない
        // given (前提条件):
        let connector = SseConnector::new(reqwest::Client::new(), "http://127.0.0.1:8080/");

        // when (操作):
        let url = connector.subscribe_url();

        // then (期待する結果):
        assert_eq!(url, "http://127.0.0.1:8080/api/quiz/subscribe");
    }
}
