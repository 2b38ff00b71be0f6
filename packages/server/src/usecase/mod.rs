//! UseCase 層
//!
//! HTTP / SSE ハンドラから呼ばれるアプリケーションのユースケース。

pub mod error;
pub mod open_quiz;
pub mod run_quiz;
pub mod submit_answer;
pub mod subscribe;

pub use error::{OpenQuizError, RunQuizError, SubmitAnswerError, SubscribeError};
pub use open_quiz::OpenQuizUseCase;
pub use run_quiz::RunQuizUseCase;
pub use submit_answer::SubmitAnswerUseCase;
pub use subscribe::SubscribeUseCase;
