//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use quizcast_shared::dto::{AnswerQuery, CORRECT_VERDICT, INCORRECT_VERDICT, OpenQuizResponse};

use crate::{
    ui::state::AppState,
    usecase::{OpenQuizError, RunQuizError, SubmitAnswerError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Open a quiz for play and hand out its PIN
pub async fn open_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<OpenQuizResponse>, StatusCode> {
    match state.open_quiz_usecase.execute(quiz_id).await {
        Ok(pin) => Ok(Json(OpenQuizResponse {
            quiz_id,
            pin: pin.as_str().to_string(),
        })),
        Err(OpenQuizError::QuizNotFound(_)) => {
            tracing::warn!("Cannot open unknown quiz {}", quiz_id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Start broadcasting questions; the run continues in the background
pub async fn start_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
) -> StatusCode {
    match state.run_quiz_usecase.start(quiz_id).await {
        Ok(_) => StatusCode::ACCEPTED,
        Err(RunQuizError::QuizNotOpen(_)) => StatusCode::NOT_FOUND,
        Err(RunQuizError::AlreadyStarted(_)) => {
            tracing::warn!("Quiz {} has already started", quiz_id);
            StatusCode::CONFLICT
        }
    }
}

/// Judge an answer; the body is the verdict text
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
    Query(query): Query<AnswerQuery>,
) -> Result<&'static str, StatusCode> {
    match state
        .submit_answer_usecase
        .execute(quiz_id, &query.username, query.question_id, query.answer)
        .await
    {
        Ok(true) => Ok(CORRECT_VERDICT),
        Ok(false) => Ok(INCORRECT_VERDICT),
        Err(SubmitAnswerError::QuizNotOpen(_)) => Err(StatusCode::NOT_FOUND),
    }
}
