//! InMemory Quiz Repository 実装
//!
//! ドメイン層が定義する QuizRepository trait の具体的な実装。
//! クイズ定義は起動時に読み込んだものを読み取り専用で保持し、
//! 公開中のクイズの状態は HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{LiveQuiz, Quiz, QuizPin, QuizQuestion, QuizRepository, RepositoryError};

/// Quiz file loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read quiz file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid quiz file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load quizzes from a JSON array of quizzes
///
/// # Errors
///
/// Returns [`CatalogError`] when the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<Vec<Quiz>, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Built-in quiz used when no quiz file is given
pub fn demo_catalog() -> Vec<Quiz> {
    let question = |id: i64, title: &str, options: &[&str], correct: i64| QuizQuestion {
        id,
        title: title.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        correct,
    };

    vec![Quiz {
        id: 1,
        title: "Warm-up".to_string(),
        questions: vec![
            question(1, "2 + 2 = ?", &["3", "4", "5"], 2),
            question(
                2,
                "Which planet is closest to the sun?",
                &["Venus", "Mercury", "Mars", "Earth"],
                2,
            ),
            question(3, "How many bits are in a byte?", &["4", "8", "16"], 2),
        ],
    }]
}

/// インメモリ Quiz Repository 実装
pub struct InMemoryQuizRepository {
    /// クイズ定義（読み取り専用）
    catalog: HashMap<i64, Quiz>,
    /// 公開中のクイズ
    live: Mutex<HashMap<i64, LiveQuiz>>,
}

impl InMemoryQuizRepository {
    /// 新しい InMemoryQuizRepository を作成
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            catalog: quizzes.into_iter().map(|quiz| (quiz.id, quiz)).collect(),
            live: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_quiz(&self, quiz_id: i64) -> Option<Quiz> {
        self.catalog.get(&quiz_id).cloned()
    }

    async fn open_quiz(&self, quiz_id: i64, pin: QuizPin) -> Result<(), RepositoryError> {
        if !self.catalog.contains_key(&quiz_id) {
            return Err(RepositoryError::QuizNotFound(quiz_id));
        }
        let mut live = self.live.lock().await;
        live.insert(quiz_id, LiveQuiz::new(quiz_id, pin));
        Ok(())
    }

    async fn find_live(&self, quiz_id: i64) -> Option<LiveQuiz> {
        let live = self.live.lock().await;
        live.get(&quiz_id).cloned()
    }

    async fn add_participant(&self, quiz_id: i64, username: &str) -> Result<(), RepositoryError> {
        let mut live = self.live.lock().await;
        let quiz = live
            .get_mut(&quiz_id)
            .ok_or(RepositoryError::QuizNotOpen(quiz_id))?;
        quiz.scoreboard.add_participant(username);
        Ok(())
    }

    async fn mark_started(&self, quiz_id: i64) -> Result<(), RepositoryError> {
        let mut live = self.live.lock().await;
        let quiz = live
            .get_mut(&quiz_id)
            .ok_or(RepositoryError::QuizNotOpen(quiz_id))?;
        if quiz.started {
            return Err(RepositoryError::AlreadyStarted(quiz_id));
        }
        quiz.started = true;
        Ok(())
    }

    async fn record_correct(
        &self,
        quiz_id: i64,
        username: &str,
        question_id: i64,
    ) -> Result<bool, RepositoryError> {
        let mut live = self.live.lock().await;
        let quiz = live
            .get_mut(&quiz_id)
            .ok_or(RepositoryError::QuizNotOpen(quiz_id))?;
        Ok(quiz.scoreboard.record_correct(username, question_id))
    }
}
