use super::*;
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use server_api::{AnswerGenerator, GenerateError, OfflineGenerator, TutorRequest};
use tower::ServiceExt;

struct EchoGenerator;

#[async_trait]
impl AnswerGenerator for EchoGenerator {
    async fn generate(&self, req: &TutorRequest) -> Result<String, GenerateError> {
        Ok(format!("[{}|{}] {}", req.exam, req.level, req.question))
    }
}

struct BrokenGenerator;

#[async_trait]
impl AnswerGenerator for BrokenGenerator {
    async fn generate(&self, _req: &TutorRequest) -> Result<String, GenerateError> {
        Err(GenerateError::Upstream("model offline".into()))
    }
}

fn test_app(generator: Arc<dyn AnswerGenerator>) -> Router {
    build_router(Arc::new(AppState {
        api: ApiContext::new(generator),
    }))
}

fn post_answer(body: impl Into<Body>) -> Request<Body> {
    Request::post(ANSWER_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app(Arc::new(EchoGenerator));
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn answer_route_returns_generated_text() {
    let app = test_app(Arc::new(EchoGenerator));
    let payload = serde_json::json!({
        "question": "  What is momentum? ",
        "exam": "JEE",
        "level": "undergraduate",
    });
    let response = app
        .oneshot(post_answer(payload.to_string()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "answer": "[JEE|undergraduate] What is momentum?" })
    );
}

#[tokio::test]
async fn missing_fields_use_defaults() {
    let app = test_app(Arc::new(EchoGenerator));
    let response = app
        .oneshot(post_answer(r#"{"question":"Define power"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["answer"],
        "[General|high-school] Define power"
    );
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let app = test_app(Arc::new(EchoGenerator));
    let response = app
        .oneshot(post_answer(r#"{"question":"   ","exam":"NEET"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "Please enter a physics question." })
    );
}

#[tokio::test]
async fn malformed_body_is_treated_as_empty_payload() {
    let app = test_app(Arc::new(EchoGenerator));
    let response = app
        .oneshot(post_answer("this is not json"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Please enter a physics question."
    );
}

#[tokio::test]
async fn generator_failure_is_internal_error_with_message() {
    let app = test_app(Arc::new(BrokenGenerator));
    let response = app
        .oneshot(post_answer(r#"{"question":"Why?"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "Failed to generate answer: upstream model error: model offline"
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app(Arc::new(OfflineGenerator));
    let question = "a".repeat(MAX_REQUEST_BYTES + 1);
    let payload = serde_json::json!({ "question": question });
    let response = app
        .oneshot(post_answer(payload.to_string()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn exams_route_lists_selector_values() {
    let app = test_app(Arc::new(OfflineGenerator));
    let request = Request::get(EXAMS_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let catalog: ExamCatalog =
        serde_json::from_value(json_body(response).await).expect("catalog");
    assert_eq!(
        catalog.exams,
        vec!["BITSAT", "General", "JEE", "NEET", "Olympiad"]
    );
    assert!(catalog.levels.contains(&"high-school".to_string()));
}
