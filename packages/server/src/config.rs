//! Server configuration.

use std::{path::PathBuf, time::Duration};

use crate::{
    domain::Quiz,
    infrastructure::repository::{CatalogError, demo_catalog, load_catalog},
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Answer time per question, in seconds
pub const DEFAULT_QUESTION_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub question_interval: Duration,
    /// JSON array of quizzes; the demo quiz is served when absent
    pub quiz_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            question_interval: Duration::from_secs(DEFAULT_QUESTION_INTERVAL_SECS),
            quiz_file: None,
        }
    }
}

impl ServerConfig {
    /// Quizzes this server can open
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the quiz file cannot be read or parsed.
    pub fn load_quizzes(&self) -> Result<Vec<Quiz>, CatalogError> {
        match &self.quiz_file {
            Some(path) => {
                let quizzes = load_catalog(path)?;
                tracing::info!("Loaded {} quizzes from {}", quizzes.len(), path.display());
                Ok(quizzes)
            }
            None => {
                tracing::info!("No quiz file given; serving the demo quiz");
                Ok(demo_catalog())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serves_demo_quiz() {
        // テスト項目: クイズファイルを指定しない場合はデモのクイズが使われる
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let quizzes = config.load_quizzes().unwrap();

        // then (期待する結果):
        assert_eq!(config.question_interval, Duration::from_secs(10));
        assert_eq!(quizzes, demo_catalog());
    }

    #[test]
    fn test_missing_quiz_file_is_an_error() {
        // テスト項目: 存在しないクイズファイルは Io エラーになる
        // given (前提条件):
        let config = ServerConfig {
            quiz_file: Some(PathBuf::from("/nonexistent/quizzes.json")),
            ..ServerConfig::default()
        };

        // when (操作):
        let result = config.load_quizzes();

        // then (期待する結果):
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
