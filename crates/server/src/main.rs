use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{answer_question, exam_catalog, AnswerPayload, ApiContext};
use shared::{
    error::{ApiError, ErrorBody, ErrorCode},
    protocol::{AnswerResponse, ExamCatalog, ANSWER_ROUTE, EXAMS_ROUTE},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let api = ApiContext::from_openai_config(settings.openai_config())?;
    info!(
        model = %settings.openai_model,
        live_model = settings.openai_api_key.is_some(),
        "answer service ready"
    );

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(EXAMS_ROUTE, get(http_list_exams))
        .route(ANSWER_ROUTE, post(http_answer))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_exams() -> Json<ExamCatalog> {
    Json(exam_catalog())
}

async fn http_answer(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnswerResponse>, (StatusCode, Json<ErrorBody>)> {
    // A missing or malformed body is treated like an empty form.
    let payload = serde_json::from_slice::<AnswerPayload>(&body).unwrap_or_else(|err| {
        debug!(%err, "answer payload was not valid JSON");
        AnswerPayload::default()
    });

    answer_question(&state.api, payload)
        .await
        .map(Json)
        .map_err(error_response)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err.into()))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
