//! イベント送信（通知）の実装
//!
//! - `sse`: Server-Sent Events のストリームに送る実装

pub mod sse;

pub use sse::SseEventPusher;
