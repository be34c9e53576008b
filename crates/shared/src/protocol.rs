use serde::{Deserialize, Serialize};

use crate::{
    domain::{Exam, Level},
    error::QuestionError,
};

pub const ANSWER_ROUTE: &str = "/api/answer";
pub const EXAMS_ROUTE: &str = "/api/exams";

/// Body of `POST /api/answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    pub exam: String,
    pub level: String,
}

impl AnswerRequest {
    /// Trims the question and rejects it when nothing is left.
    pub fn new(question: &str, exam: Exam, level: Level) -> Result<Self, QuestionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QuestionError::Blank);
        }
        Ok(Self {
            question: question.to_string(),
            exam: exam.as_str().to_string(),
            level: level.as_str().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Either shape the answer route can reply with. Clients decode into this
/// before looking at the status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnswerEnvelope {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamCatalog {
    pub exams: Vec<String>,
    pub levels: Vec<String>,
}

impl Default for ExamCatalog {
    fn default() -> Self {
        Self {
            exams: Exam::ALL.iter().map(|exam| exam.as_str().to_string()).collect(),
            levels: Level::ALL
                .iter()
                .map(|level| level.as_str().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_trims_question_and_uses_wire_labels() {
        let req = AnswerRequest::new("  why is the sky blue?\n", Exam::Neet, Level::HighSchool)
            .expect("request");
        assert_eq!(req.question, "why is the sky blue?");
        assert_eq!(
            serde_json::to_value(&req).expect("json"),
            serde_json::json!({
                "question": "why is the sky blue?",
                "exam": "NEET",
                "level": "high-school",
            })
        );
    }

    #[test]
    fn whitespace_question_is_blank() {
        assert_eq!(
            AnswerRequest::new(" \t\n", Exam::General, Level::Beginner),
            Err(QuestionError::Blank)
        );
    }

    #[test]
    fn envelope_accepts_either_shape() {
        let ok: AnswerEnvelope = serde_json::from_str(r#"{"answer":"42"}"#).expect("json");
        assert_eq!(ok.answer.as_deref(), Some("42"));
        let err: AnswerEnvelope = serde_json::from_str(r#"{"error":"bad"}"#).expect("json");
        assert_eq!(err.error.as_deref(), Some("bad"));
        let empty: AnswerEnvelope = serde_json::from_str("{}").expect("json");
        assert_eq!(empty, AnswerEnvelope::default());
    }
}
