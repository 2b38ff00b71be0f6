//! UseCase 層のエラー定義

use thiserror::Error;

/// クイズ公開のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenQuizError {
    #[error("quiz {0} does not exist")]
    QuizNotFound(i64),
}

/// 購読（参加）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("quiz {0} is not open")]
    QuizNotOpen(i64),

    #[error("wrong PIN for quiz {0}")]
    InvalidPin(i64),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("failed to acknowledge subscription: {0}")]
    AckFailed(String),
}

/// 回答のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitAnswerError {
    #[error("quiz {0} is not open")]
    QuizNotOpen(i64),
}

/// 出題開始のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunQuizError {
    #[error("quiz {0} is not open")]
    QuizNotOpen(i64),

    #[error("quiz {0} has already started")]
    AlreadyStarted(i64),
}
