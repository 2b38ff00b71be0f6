//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{LiveQuiz, Quiz, QuizPin, RepositoryError};

/// Quiz Repository trait
///
/// クイズの定義（読み取り専用）と、公開中のクイズの状態（PIN、開始済みか、スコア）を扱う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// クイズ定義を取得
    async fn find_quiz(&self, quiz_id: i64) -> Option<Quiz>;

    /// クイズを公開する。既に公開中なら PIN とスコアを作り直す
    async fn open_quiz(&self, quiz_id: i64, pin: QuizPin) -> Result<(), RepositoryError>;

    /// 公開中のクイズの状態を取得
    async fn find_live(&self, quiz_id: i64) -> Option<LiveQuiz>;

    /// 参加者をスコアボードに追加
    async fn add_participant(&self, quiz_id: i64, username: &str) -> Result<(), RepositoryError>;

    /// 出題開始を記録する。開始は 1 回だけ
    async fn mark_started(&self, quiz_id: i64) -> Result<(), RepositoryError>;

    /// 正解を記録し、加点されたかを返す
    async fn record_correct(
        &self,
        quiz_id: i64,
        username: &str,
        question_id: i64,
    ) -> Result<bool, RepositoryError>;
}
