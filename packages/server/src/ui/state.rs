//! Server state shared by the handlers.

use crate::usecase::{OpenQuizUseCase, RunQuizUseCase, SubmitAnswerUseCase, SubscribeUseCase};

/// Shared application state
pub struct AppState {
    /// OpenQuizUseCase（クイズ公開のユースケース）
    pub open_quiz_usecase: OpenQuizUseCase,
    /// SubscribeUseCase（参加者購読のユースケース）
    pub subscribe_usecase: SubscribeUseCase,
    /// SubmitAnswerUseCase（回答判定のユースケース）
    pub submit_answer_usecase: SubmitAnswerUseCase,
    /// RunQuizUseCase（出題のユースケース）
    pub run_quiz_usecase: RunQuizUseCase,
}
