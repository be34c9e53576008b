use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{AnswerEnvelope, AnswerRequest, ExamCatalog, ANSWER_ROUTE, EXAMS_ROUTE};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Failure of one answer request. `Display` is the text shown after `Error: `.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The host could not hand the request to its network worker.
    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AnswerTransport: Send + Sync {
    async fn request_answer(&self, request: &AnswerRequest) -> Result<String, AnswerError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    answer_url: Url,
    exams_url: Url,
}

impl ApiClient {
    pub fn new(server_url: &str) -> Result<Self, AnswerError> {
        let base = Url::parse(server_url.trim())?;
        Ok(Self {
            http: Client::new(),
            answer_url: base.join(ANSWER_ROUTE)?,
            exams_url: base.join(EXAMS_ROUTE)?,
        })
    }

    pub fn answer_url(&self) -> &Url {
        &self.answer_url
    }

    pub async fn list_exams(&self) -> Result<ExamCatalog, AnswerError> {
        let catalog: ExamCatalog = self
            .http
            .get(self.exams_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(catalog)
    }
}

#[async_trait]
impl AnswerTransport for ApiClient {
    async fn request_answer(&self, request: &AnswerRequest) -> Result<String, AnswerError> {
        let res = self
            .http
            .post(self.answer_url.clone())
            .json(request)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;
        debug!(%status, bytes = body.len(), "answer response received");

        let envelope = serde_json::from_slice::<AnswerEnvelope>(&body);
        if !status.is_success() {
            let message = envelope
                .ok()
                .and_then(|envelope| envelope.error)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string());
            return Err(AnswerError::Server(message));
        }

        envelope
            .map_err(|err| AnswerError::Decode(format!("invalid response body: {err}")))?
            .answer
            .ok_or_else(|| AnswerError::Decode("response did not include an answer".to_string()))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
