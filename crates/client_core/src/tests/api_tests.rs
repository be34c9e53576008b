use super::*;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{Exam, Level},
    protocol::AnswerRequest,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn replying(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(
        ANSWER_ROUTE,
        post(move || async move { (status, [("content-type", "application/json")], body) }),
    )
}

fn request() -> AnswerRequest {
    AnswerRequest::new("What is g?", Exam::Jee, Level::HighSchool).expect("request")
}

#[test]
fn answer_url_is_rooted_at_server() {
    let client = ApiClient::new("http://tutor.local:8000/some/page").expect("client");
    assert_eq!(
        client.answer_url().as_str(),
        "http://tutor.local:8000/api/answer"
    );
}

#[test]
fn rejects_unparseable_server_url() {
    let err = ApiClient::new("tutor without scheme").err().expect("should fail");
    assert!(matches!(err, AnswerError::InvalidUrl(_)));
}

#[tokio::test]
async fn posts_json_request_and_returns_answer() {
    let seen: Arc<Mutex<Option<(Option<String>, serde_json::Value)>>> =
        Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let app = Router::new().route(
        ANSWER_ROUTE,
        post(
            move |headers: axum::http::HeaderMap, Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    *sink.lock().expect("lock") = Some((content_type, body));
                    Json(serde_json::json!({ "answer": "9.8 m/s^2" }))
                }
            },
        ),
    );
    let client = ApiClient::new(&spawn_stub(app).await).expect("client");

    let answer = client.request_answer(&request()).await.expect("answer");
    assert_eq!(answer, "9.8 m/s^2");

    let (content_type, body) = seen.lock().expect("lock").clone().expect("request seen");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        serde_json::json!({ "question": "What is g?", "exam": "JEE", "level": "high-school" })
    );
}

#[tokio::test]
async fn failure_status_surfaces_error_field() {
    let base = spawn_stub(replying(StatusCode::BAD_REQUEST, r#"{"error":"bad input"}"#)).await;
    let client = ApiClient::new(&base).expect("client");

    let err = client.request_answer(&request()).await.expect_err("should fail");
    assert!(matches!(err, AnswerError::Server(_)));
    assert_eq!(err.to_string(), "bad input");
}

#[tokio::test]
async fn failure_status_without_error_field_is_unknown_server_error() {
    let base = spawn_stub(replying(StatusCode::INTERNAL_SERVER_ERROR, "{}")).await;
    let client = ApiClient::new(&base).expect("client");

    let err = client.request_answer(&request()).await.expect_err("should fail");
    assert_eq!(err.to_string(), UNKNOWN_SERVER_ERROR);
}

#[tokio::test]
async fn failure_status_with_non_json_body_is_unknown_server_error() {
    let app = Router::new().route(
        ANSWER_ROUTE,
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let client = ApiClient::new(&spawn_stub(app).await).expect("client");

    let err = client.request_answer(&request()).await.expect_err("should fail");
    assert_eq!(err.to_string(), UNKNOWN_SERVER_ERROR);
}

#[tokio::test]
async fn success_without_answer_is_decode_error() {
    let base = spawn_stub(replying(StatusCode::OK, r#"{"note":"nothing here"}"#)).await;
    let client = ApiClient::new(&base).expect("client");

    let err = client.request_answer(&request()).await.expect_err("should fail");
    assert!(matches!(err, AnswerError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}")).expect("client");
    let err = client.request_answer(&request()).await.expect_err("should fail");
    assert!(matches!(err, AnswerError::Transport(_)));
}

#[tokio::test]
async fn lists_exam_catalog() {
    let app = Router::new().route(
        EXAMS_ROUTE,
        get(|| async { Json(ExamCatalog::default()) }),
    );
    let client = ApiClient::new(&spawn_stub(app).await).expect("client");

    let catalog = client.list_exams().await.expect("catalog");
    assert_eq!(catalog.exams.len(), Exam::ALL.len());
    assert_eq!(catalog.levels.len(), Level::ALL.len());
}
