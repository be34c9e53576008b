//! Answer generation backends.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{build_prompt, TutorRequest};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid model endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("request to model failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream model error: {0}")]
    Upstream(String),
    #[error("model returned no text")]
    EmptyOutput,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, req: &TutorRequest) -> Result<String, GenerateError>;
}

/// Used when no model credentials are configured.
pub struct OfflineGenerator;

#[async_trait]
impl AnswerGenerator for OfflineGenerator {
    async fn generate(&self, req: &TutorRequest) -> Result<String, GenerateError> {
        Ok(format!(
            "I can explain this once an API key is configured. \
             Set OPENAI_API_KEY to enable full oral physics answers. \
             Meanwhile, try this framing: identify known quantities, pick the governing law, \
             and solve stepwise for: {}",
            req.question
        ))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

pub struct OpenAiGenerator {
    http: Client,
    endpoint: Url,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: String,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

impl ResponsesBody {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text.filter(|text| !text.trim().is_empty()) {
            return text;
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerateError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)?.join("responses")?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    async fn generate(&self, req: &TutorRequest) -> Result<String, GenerateError> {
        debug!(model = %self.config.model, endpoint = %self.endpoint, "requesting model answer");
        let res = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&ResponsesRequest {
                model: &self.config.model,
                input: build_prompt(req),
                temperature: self.config.temperature,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            return Err(GenerateError::Upstream(upstream_message(status, &raw)));
        }

        let body: ResponsesBody = res.json().await?;
        let text = body.into_text().trim().to_string();
        if text.is_empty() {
            return Err(GenerateError::EmptyOutput);
        }
        Ok(text)
    }
}

fn upstream_message(status: StatusCode, raw: &str) -> String {
    serde_json::from_str::<UpstreamErrorBody>(raw)
        .map(|body| body.error.message)
        .unwrap_or_else(|_| format!("model endpoint returned {status}"))
}

#[cfg(test)]
#[path = "tests/generator_tests.rs"]
mod tests;
