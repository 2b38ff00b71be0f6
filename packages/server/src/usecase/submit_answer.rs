//! UseCase: 回答の判定
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitAnswerUseCase::execute() メソッド
//! - 正誤判定と、正解時の加点
//!
//! ### なぜこのテストが必要か
//! - 最終順位は加点の結果で決まる
//! - 回答なし（時間切れ）は不正解として扱われることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：正解、不正解
//! - エッジケース：回答なし、存在しない問題
//! - 異常系：公開されていないクイズ

use std::sync::Arc;

use crate::domain::QuizRepository;

use super::error::SubmitAnswerError;

/// 回答判定のユースケース
pub struct SubmitAnswerUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn QuizRepository>,
}

impl SubmitAnswerUseCase {
    /// 新しい SubmitAnswerUseCase を作成
    pub fn new(repository: Arc<dyn QuizRepository>) -> Self {
        Self { repository }
    }

    /// 回答を判定し、正解かどうかを返す
    ///
    /// 存在しない問題への回答と回答なしは不正解。
    pub async fn execute(
        &self,
        quiz_id: i64,
        username: &str,
        question_id: i64,
        answer: Option<i64>,
    ) -> Result<bool, SubmitAnswerError> {
        if self.repository.find_live(quiz_id).await.is_none() {
            return Err(SubmitAnswerError::QuizNotOpen(quiz_id));
        }

        let correct = self
            .repository
            .find_quiz(quiz_id)
            .await
            .and_then(|quiz| quiz.question(question_id).map(|q| q.is_correct(answer)))
            .unwrap_or(false);

        if correct {
            let scored = self
                .repository
                .record_correct(quiz_id, username, question_id)
                .await
                .map_err(|_| SubmitAnswerError::QuizNotOpen(quiz_id))?;
            if !scored {
                tracing::debug!(
                    "'{}' already scored question {} of quiz {}",
                    username,
                    question_id,
                    quiz_id
                );
            }
        }

        tracing::debug!(
            "'{}' answered {:?} to question {} of quiz {}: {}",
            username,
            answer,
            question_id,
            quiz_id,
            if correct { "correct" } else { "incorrect" }
        );
        Ok(correct)
    }
}
