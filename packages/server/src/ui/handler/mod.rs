//! Request handlers.

mod http;
mod sse;

pub use http::{health_check, open_quiz, start_quiz, submit_answer};
pub use sse::subscribe_handler;
