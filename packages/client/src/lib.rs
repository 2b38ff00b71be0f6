//! Participant client for live quizzes.
//!
//! A participant joins with a quiz id, PIN and username, receives questions
//! over a server-sent event stream, answers each one before its countdown
//! runs out and finally learns their rank.

pub mod channel;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runner;
pub mod submitter;
pub mod timer;
pub mod ui;

pub use config::{AmbiguousPolicy, ClientConfig};
pub use error::ClientError;
pub use runner::{QuizSession, UserCommand};
