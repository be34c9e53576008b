use std::sync::Arc;

use serde::Deserialize;
use shared::{
    domain::{Exam, Level},
    error::ApiError,
    protocol::{AnswerResponse, ExamCatalog},
};
use tracing::{info, warn};

mod generator;

pub use generator::{
    AnswerGenerator, GenerateError, OfflineGenerator, OpenAiConfig, OpenAiGenerator,
};

pub const BLANK_QUESTION_MESSAGE: &str = "Please enter a physics question.";

#[derive(Clone)]
pub struct ApiContext {
    pub generator: Arc<dyn AnswerGenerator>,
}

impl ApiContext {
    pub fn new(generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { generator }
    }

    /// OpenAI-backed when a key is configured, offline guidance otherwise.
    pub fn from_openai_config(config: Option<OpenAiConfig>) -> Result<Self, GenerateError> {
        let generator: Arc<dyn AnswerGenerator> = match config {
            Some(config) => Arc::new(OpenAiGenerator::new(config)?),
            None => {
                warn!("no language model API key configured; serving offline guidance answers");
                Arc::new(OfflineGenerator)
            }
        };
        Ok(Self { generator })
    }
}

/// Lenient view of the answer payload: every field may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// Normalised request the tutor works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorRequest {
    pub question: String,
    pub exam: String,
    pub level: String,
}

impl TutorRequest {
    pub fn from_payload(payload: AnswerPayload) -> Self {
        Self {
            question: payload.question.unwrap_or_default().trim().to_string(),
            exam: payload
                .exam
                .unwrap_or_else(|| Exam::General.as_str().to_string()),
            level: payload
                .level
                .unwrap_or_else(|| Level::HighSchool.as_str().to_string()),
        }
    }

    /// Exams outside the table are tutored with the general framing.
    pub fn exam_context(&self) -> &'static str {
        Exam::from_label(&self.exam)
            .unwrap_or(Exam::General)
            .context()
    }
}

pub fn build_prompt(req: &TutorRequest) -> String {
    format!(
        "You are PhysicsGPT, an expert physics tutor for competitive exams. \
         Student level: {level}. \
         Exam context: {context} \
         Answer with: (1) core concept, (2) step-by-step solution, \
         (3) final answer, and (4) quick exam tip. Keep language clear and friendly. \
         Question: {question}",
        level = req.level,
        context = req.exam_context(),
        question = req.question,
    )
}

pub fn exam_catalog() -> ExamCatalog {
    ExamCatalog::default()
}

pub async fn answer_question(
    ctx: &ApiContext,
    payload: AnswerPayload,
) -> Result<AnswerResponse, ApiError> {
    let req = TutorRequest::from_payload(payload);
    if req.question.is_empty() {
        return Err(ApiError::validation(BLANK_QUESTION_MESSAGE));
    }

    info!(exam = %req.exam, level = %req.level, chars = req.question.len(), "generating answer");
    let answer = ctx.generator.generate(&req).await.map_err(|err| {
        warn!(%err, "answer generation failed");
        ApiError::internal(format!("Failed to generate answer: {err}"))
    })?;
    Ok(AnswerResponse { answer })
}
