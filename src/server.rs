use crate::config::BridgeConfig;
use crate::engine::{TranslationEngine, TranslationOutcome};
use crate::error::BridgeError;
use crate::logging::SharedLogger;
use crate::translate::dialect::{ApiType, PayloadKind, TranslationDirection};
use crate::translate::roundtrip;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const DEFAULT_LOG_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub config: BridgeConfig,
    pub engine: TranslationEngine,
    pub logger: SharedLogger,
}

/// `{"error": {"type": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error(err: &BridgeError) -> Self {
        Self {
            error: ErrorDetail {
                error_type: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

fn status_for(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::ModelNotFound { .. } => StatusCode::NOT_FOUND,
        _ if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &BridgeError) -> Response {
    (status_for(err), Json(ErrorResponse::from_error(err))).into_response()
}

/// Body of `POST /v1/translate`.
#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    pub kind: PayloadKind,
    pub client_api: ApiType,
    /// Routing key. For responses it falls back to the payload's own `model`.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    pub payload: Value,
}

/// Body of `POST /v1/roundtrip`.
#[derive(Debug, Deserialize)]
pub struct RoundTripBody {
    pub direction: TranslationDirection,
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/chat/completions", post(handle_chat_completions))
        .route("/v1/responses", post(handle_responses))
        .route("/v1/translate", post(handle_translate))
        .route("/v1/roundtrip", post(handle_roundtrip))
        .route("/v1/models", get(handle_models))
        .route("/v1/logs", get(handle_logs))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_chat_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    translate_client_request(&state, ApiType::ChatCompletions, &headers, &body)
}

async fn handle_responses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    translate_client_request(&state, ApiType::Response, &headers, &body)
}

fn translate_client_request(
    state: &AppState,
    client_api: ApiType,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response {
    let payload = match parse_body::<Value>(state, body) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };

    let result = state
        .engine
        .translate_request(client_api, &payload, request_id_header(headers));
    outcome_response(result)
}

async fn handle_translate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req: TranslateBody = match parse_body(&state, &body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let request_id = req.request_id.or_else(|| request_id_header(&headers));

    let result = match req.kind {
        PayloadKind::Request => state
            .engine
            .translate_request(req.client_api, &req.payload, request_id),
        PayloadKind::Response => {
            let model = req.model.or_else(|| {
                req.payload
                    .get("model")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
            match model {
                Some(model) => state.engine.translate_response(
                    req.client_api,
                    &model,
                    &req.payload,
                    request_id,
                ),
                None => Err(BridgeError::schema(
                    req.client_api,
                    "model",
                    "response translation needs a routing model",
                )),
            }
        }
    };
    outcome_response(result)
}

async fn handle_roundtrip(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req: RoundTripBody = match parse_body(&state, &body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let result = roundtrip::verify(&req.payload, req.direction);
    if !result.success {
        state.logger.warn(
            "server",
            format!(
                "Round trip {} diverged: {}",
                req.direction,
                result.differences.join("; ")
            ),
        );
    }
    Json(result).into_response()
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "models": state.engine.router().len(),
        "shadow_verify": state.config.translation.shadow_verify,
    }))
}

async fn handle_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    let models: Vec<Value> = state
        .engine
        .router()
        .entries()
        .map(|(name, api_type)| {
            serde_json::json!({
                "id": name,
                "object": "model",
                "api_type": api_type,
            })
        })
        .collect();

    Json(serde_json::json!({ "data": models, "object": "list" }))
}

async fn handle_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Json<Value> {
    let entries = state.logger.recent(query.limit.unwrap_or(DEFAULT_LOG_LIMIT));
    Json(serde_json::json!({ "data": entries, "object": "list" }))
}

fn parse_body<T: serde::de::DeserializeOwned>(
    state: &AppState,
    body: &Bytes,
) -> std::result::Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        state
            .logger
            .error("server", format!("Failed to parse request: {}", e));
        error_response(&BridgeError::from(e))
    })
}

fn outcome_response(result: crate::error::Result<TranslationOutcome>) -> Response {
    match result {
        Ok(outcome) => {
            let header = HeaderValue::from_str(&outcome.request_id).ok();
            let mut resp = Json(outcome).into_response();
            if let Some(value) = header {
                resp.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            resp
        }
        Err(e) => error_response(&e),
    }
}

fn request_id_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
