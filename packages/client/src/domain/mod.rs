//! Domain layer of the participant client.
//!
//! Pure session logic without I/O: value objects, entities, the score
//! tracker, the session state machine and the ports it needs.

pub mod entity;
pub mod port;
pub mod score;
pub mod session;
pub mod value_object;

pub use entity::{AnswerOutcome, AnswerRecord, Question, RankResult, Resolution, Selection};
#[cfg(test)]
pub use port::MockAnswerApi;
pub use port::{AnswerApi, PushConnector, PushTransport, RawEvent, SubmitRequest};
pub use score::ScoreTracker;
pub use session::{
    ConnectionState, Effect, PushEvent, SessionSnapshot, SessionState, SessionStateMachine,
};
pub use value_object::{JoinRequest, OptionToken, Pin, QuestionId, QuizId, Username};
