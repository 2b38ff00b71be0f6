//! HTTP adapters for the domain ports.

pub mod http_answer_api;
pub mod sse;

pub use http_answer_api::HttpAnswerApi;
pub use sse::{SseConnector, SseDecoder};
