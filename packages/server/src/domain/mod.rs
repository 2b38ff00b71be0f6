//! Domain layer of the quiz host.

pub mod error;
pub mod pusher;
pub mod quiz;
pub mod repository;

pub use error::{EventPushError, RepositoryError};
#[cfg(test)]
pub use pusher::MockEventPusher;
pub use pusher::{EventPusher, PusherChannel, ServerEvent};
pub use quiz::{LiveQuiz, Quiz, QuizPin, QuizQuestion, RankEntry, Scoreboard};
#[cfg(test)]
pub use repository::MockQuizRepository;
pub use repository::QuizRepository;
