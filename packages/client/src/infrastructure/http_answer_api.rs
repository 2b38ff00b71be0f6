//! HTTP implementation of the answer endpoint.

use async_trait::async_trait;

use quizcast_shared::dto::AnswerQuery;

use crate::{
    domain::{AnswerApi, SubmitRequest},
    error::SubmissionError,
};

/// Posts answers to `POST {base_url}/api/quiz/{quizId}/answer`
pub struct HttpAnswerApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnswerApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Answer URL with the quiz id pushed as one escaped path segment
    fn answer_url(&self, request: &SubmitRequest) -> Result<reqwest::Url, SubmissionError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SubmissionError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SubmissionError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "quiz", request.quiz_id.as_str(), "answer"]);
        Ok(url)
    }
}

/// Query for one submission; an empty selection sends no `answer`
pub fn answer_query(request: &SubmitRequest) -> AnswerQuery {
    AnswerQuery {
        username: request.username.to_string(),
        question_id: request.question_id.value(),
        answer: request.selection.option().map(|option| option.value()),
    }
}

#[async_trait]
impl AnswerApi for HttpAnswerApi {
    async fn submit(&self, request: &SubmitRequest) -> Result<String, SubmissionError> {
        let response = self
            .client
            .post(self.answer_url(request)?)
            .query(&answer_query(request))
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(SubmissionError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
