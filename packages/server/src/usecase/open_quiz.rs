//! UseCase: クイズ公開処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - OpenQuizUseCase::execute() メソッド
//! - PIN の発行と Repository への公開状態の保存
//!
//! ### なぜこのテストが必要か
//! - 参加者は発行された PIN でしか参加できない
//! - 存在しないクイズを公開できないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：クイズを公開して PIN を受け取る
//! - 異常系：存在しないクイズの公開

use std::sync::Arc;

use crate::domain::{QuizPin, QuizRepository, RepositoryError};

use super::error::OpenQuizError;

/// クイズ公開のユースケース
pub struct OpenQuizUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn QuizRepository>,
}

impl OpenQuizUseCase {
    /// 新しい OpenQuizUseCase を作成
    pub fn new(repository: Arc<dyn QuizRepository>) -> Self {
        Self { repository }
    }

    /// クイズを公開し、発行した PIN を返す
    ///
    /// 公開中のクイズをもう一度公開すると、PIN とスコアは作り直される。
    pub async fn execute(&self, quiz_id: i64) -> Result<QuizPin, OpenQuizError> {
        let pin = QuizPin::generate();
        self.repository
            .open_quiz(quiz_id, pin.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::QuizNotFound(id)
                | RepositoryError::QuizNotOpen(id)
                | RepositoryError::AlreadyStarted(id) => OpenQuizError::QuizNotFound(id),
            })?;

        tracing::info!("Quiz {} opened with PIN {}", quiz_id, pin.as_str());
        Ok(pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockQuizRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_open_quiz_returns_stored_pin() {
        // テスト項目: 公開したクイズの PIN が Repository に保存され、同じ PIN が返る
        // given (前提条件):
        let stored = Arc::new(std::sync::Mutex::new(None));
        let stored_in_mock = stored.clone();
        let mut repository = MockQuizRepository::new();
        repository
            .expect_open_quiz()
            .with(eq(1), mockall::predicate::always())
            .times(1)
            .returning(move |_, pin| {
                *stored_in_mock.lock().unwrap() = Some(pin);
                Ok(())
            });
        let usecase = OpenQuizUseCase::new(Arc::new(repository));

        // when (操作):
        let pin = usecase.execute(1).await.unwrap();

        // then (期待する結果):
        assert_eq!(stored.lock().unwrap().as_ref(), Some(&pin));
        assert_eq!(pin.as_str().len(), 4);
    }

    #[tokio::test]
    async fn test_open_unknown_quiz() {
        // テスト項目: 存在しないクイズは公開できない
        // given (前提条件):
        let mut repository = MockQuizRepository::new();
        repository
            .expect_open_quiz()
            .returning(|quiz_id, _| Err(RepositoryError::QuizNotFound(quiz_id)));
        let usecase = OpenQuizUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(42).await;

        // then (期待する結果):
        assert_eq!(result, Err(OpenQuizError::QuizNotFound(42)));
    }
}
