//! Code shared by the quizcast client and host server.
//!
//! - `dto`: wire payloads of the push channel and the answer endpoint
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and JST timestamp helpers

pub mod dto;
pub mod logger;
pub mod time;
