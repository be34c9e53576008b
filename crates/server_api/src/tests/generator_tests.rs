use super::*;
use axum::{http::HeaderMap, routing::post, Json, Router};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Captured = Arc<Mutex<Option<(Option<String>, serde_json::Value)>>>;

async fn spawn_model_stub(status: StatusCode, reply: serde_json::Value) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(None));
    let sink = captured.clone();
    let app = Router::new().route(
        "/v1/responses",
        post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
            let sink = sink.clone();
            let reply = reply.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                *sink.lock().expect("lock") = Some((auth, body));
                (status, Json(reply))
            }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/v1"), captured)
}

fn config(base_url: String) -> OpenAiConfig {
    OpenAiConfig {
        api_key: "sk-test".into(),
        model: "gpt-4.1-mini".into(),
        base_url,
        temperature: 0.2,
    }
}

fn request() -> TutorRequest {
    TutorRequest {
        question: "What is inertia?".into(),
        exam: "NEET".into(),
        level: "high-school".into(),
    }
}

#[test]
fn endpoint_joins_responses_onto_base_path() {
    let generator = OpenAiGenerator::new(config("https://api.openai.com/v1/".into())).expect("gen");
    assert_eq!(
        generator.endpoint().as_str(),
        "https://api.openai.com/v1/responses"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = OpenAiGenerator::new(config("not a url".into()))
        .err()
        .expect("should fail");
    assert!(matches!(err, GenerateError::InvalidEndpoint(_)));
}

#[tokio::test]
async fn concatenates_output_text_parts_and_sends_prompt() {
    let (base_url, captured) = spawn_model_stub(
        StatusCode::OK,
        serde_json::json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "  Inertia is " },
                    { "type": "output_text", "text": "resistance to change.  " }
                ]}
            ]
        }),
    )
    .await;

    let generator = OpenAiGenerator::new(config(base_url)).expect("gen");
    let answer = generator.generate(&request()).await.expect("answer");
    assert_eq!(answer, "Inertia is resistance to change.");

    let (auth, body) = captured.lock().expect("lock").clone().expect("request seen");
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4.1-mini");
    let input = body["input"].as_str().expect("input");
    assert!(input.contains(shared::domain::Exam::Neet.context()));
    assert!(input.ends_with("Question: What is inertia?"));
}

#[tokio::test]
async fn upstream_error_message_is_surfaced() {
    let (base_url, _captured) = spawn_model_stub(
        StatusCode::TOO_MANY_REQUESTS,
        serde_json::json!({ "error": { "message": "Rate limit reached" } }),
    )
    .await;

    let generator = OpenAiGenerator::new(config(base_url)).expect("gen");
    let err = generator.generate(&request()).await.expect_err("should fail");
    assert_eq!(err.to_string(), "upstream model error: Rate limit reached");
}

#[tokio::test]
async fn empty_output_is_an_error() {
    let (base_url, _captured) =
        spawn_model_stub(StatusCode::OK, serde_json::json!({ "output": [] })).await;

    let generator = OpenAiGenerator::new(config(base_url)).expect("gen");
    let err = generator.generate(&request()).await.expect_err("should fail");
    assert!(matches!(err, GenerateError::EmptyOutput));
}
