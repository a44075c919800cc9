//! HTTP front end.
//!
//! A thin JSON transport over [`AnswerPipeline::answer_with_outcome`].
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ask` | `{"question": "..."}` → `{"answer": "...", "source": "model"}` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Errors use `{ "error": { "code": "...", "message": "..." } }` with
//! `bad_request` (400) for an empty question and `configuration` (500) when
//! the pipeline is misconfigured.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use manualqa_core::Error;
use manualqa_rag::{AnswerPipeline, AnswerSource};

/// Build the router serving `/ask` and `/health`
pub fn router(pipeline: Arc<AnswerPipeline>) -> Router {
    Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Serve until the process is terminated
pub async fn run_server(pipeline: Arc<AnswerPipeline>, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    source: AnswerSource,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    language_model: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let (status, code) = match err {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

async fn handle_ask(
    State(pipeline): State<Arc<AnswerPipeline>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let outcome = pipeline.answer_with_outcome(&request.question).await?;
    Ok(Json(AskResponse {
        answer: outcome.answer,
        source: outcome.source,
    }))
}

async fn handle_health(State(pipeline): State<Arc<AnswerPipeline>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        language_model: pipeline.has_language_model(),
    })
}
