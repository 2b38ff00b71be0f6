//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::{
        pusher::SseEventPusher,
        repository::{CatalogError, InMemoryQuizRepository},
    },
    usecase::{OpenQuizUseCase, RunQuizUseCase, SubmitAnswerUseCase, SubscribeUseCase},
};

use super::{
    handler::{health_check, open_quiz, start_quiz, submit_answer, subscribe_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Quiz host server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let server = Server::from_config(&config)?;
/// server.run(&config.host, config.port).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Wire the in-memory repository, the SSE pusher and the use cases
    ///
    /// Initialization order:
    /// 1. Repository
    /// 2. EventPusher
    /// 3. UseCases
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the configured quiz file cannot be loaded.
    pub fn from_config(config: &ServerConfig) -> Result<Self, CatalogError> {
        let repository = Arc::new(InMemoryQuizRepository::new(config.load_quizzes()?));
        let pusher = Arc::new(SseEventPusher::new());

        Ok(Self::new(AppState {
            open_quiz_usecase: OpenQuizUseCase::new(repository.clone()),
            subscribe_usecase: SubscribeUseCase::new(repository.clone(), pusher.clone()),
            submit_answer_usecase: SubmitAnswerUseCase::new(repository.clone()),
            run_quiz_usecase: RunQuizUseCase::new(repository, pusher, config.question_interval),
        }))
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_check))
            .route("/api/quiz/subscribe", get(subscribe_handler))
            .route("/api/quiz/{quiz_id}/open", post(open_quiz))
            .route("/api/quiz/{quiz_id}/start", post(start_quiz))
            .route("/api/quiz/{quiz_id}/answer", post(submit_answer))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the quiz host server until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Quiz host server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
