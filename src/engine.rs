//! Translation orchestration: route, resolve, translate, log.
//!
//! The engine is the only place that combines the pure translation functions with the
//! routing table and the log sink. Each call gets its own [`TranslationContext`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::context::TranslationContext;
use crate::error::{BridgeError, Result};
use crate::logging::{LogLevel, SharedLogger, TRANSLATION_COMPONENT};
use crate::router::ModelRouter;
use crate::translate::dialect::{
    resolve_direction, ApiType, PayloadKind, Resolution, TranslationDirection, TranslationMode,
};
use crate::translate::roundtrip;
use crate::translate::translate_value;
use crate::translate::unknown::{detect, known_keys};

/// Result of one engine call, as returned to HTTP clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationOutcome {
    pub request_id: String,
    pub model: String,
    /// Dialect the payload arrived in.
    pub source: ApiType,
    /// Dialect the payload was reshaped into.
    pub target: ApiType,
    pub mode: TranslationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<TranslationDirection>,
    pub unknown_fields: Vec<String>,
    pub unmapped_fields: Vec<String>,
    pub dropped_fields: Vec<String>,
    pub payload: Value,
}

#[derive(Clone)]
pub struct TranslationEngine {
    router: Arc<ModelRouter>,
    logger: SharedLogger,
    shadow_verify: bool,
}

impl TranslationEngine {
    pub fn new(router: Arc<ModelRouter>, logger: SharedLogger) -> Self {
        Self {
            router,
            logger,
            shadow_verify: false,
        }
    }

    pub fn with_shadow_verify(mut self, enabled: bool) -> Self {
        self.shadow_verify = enabled;
        self
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    /// Translate a client request in `client_api` into whatever dialect its model's
    /// backend speaks. Unrouted models are rejected before any translation happens.
    pub fn translate_request(
        &self,
        client_api: ApiType,
        payload: &Value,
        request_id: Option<String>,
    ) -> Result<TranslationOutcome> {
        let ctx = TranslationContext::new(request_id, PayloadKind::Request);

        let model = match request_model(client_api, payload) {
            Ok(model) => model,
            Err(e) => return Err(self.fail(&ctx, e)),
        };
        let ctx = ctx.with_model(model.clone());

        let backend = match self.router.resolve(&model) {
            Ok(backend) => backend,
            Err(e) => return Err(self.fail(&ctx, e)),
        };

        self.run(ctx, model, client_api, backend, payload)
    }

    /// Translate a backend response for `model` back into the client's dialect.
    pub fn translate_response(
        &self,
        client_api: ApiType,
        model: &str,
        payload: &Value,
        request_id: Option<String>,
    ) -> Result<TranslationOutcome> {
        let ctx = TranslationContext::new(request_id, PayloadKind::Response).with_model(model);

        let backend = match self.router.resolve(model) {
            Ok(backend) => backend,
            Err(e) => return Err(self.fail(&ctx, e)),
        };

        self.run(ctx, model.to_string(), backend, client_api, payload)
    }

    fn run(
        &self,
        ctx: TranslationContext,
        model: String,
        source: ApiType,
        target: ApiType,
        payload: &Value,
    ) -> Result<TranslationOutcome> {
        let resolution = resolve_direction(source, target, ctx.kind);
        let ctx = ctx.with_resolution(resolution);

        let outcome = match resolution {
            Resolution::PassThrough => {
                let unknown_fields = payload
                    .as_object()
                    .map(|map| detect(map, known_keys(source, ctx.kind)).unknown_fields)
                    .unwrap_or_default();
                TranslationOutcome {
                    request_id: ctx.request_id.clone(),
                    model,
                    source,
                    target,
                    mode: TranslationMode::PassThrough,
                    direction: None,
                    unknown_fields,
                    unmapped_fields: Vec::new(),
                    dropped_fields: Vec::new(),
                    payload: payload.clone(),
                }
            }
            Resolution::Translate(direction) => {
                let translated = match translate_value(direction, payload) {
                    Ok(translated) => translated,
                    Err(e) => return Err(self.fail(&ctx, e)),
                };

                self.logger.log_unknown_fields(
                    &ctx.request_id,
                    direction,
                    &translated.unknown.unknown_fields,
                );
                if self.shadow_verify && direction.kind() == PayloadKind::Request {
                    self.shadow(&ctx.request_id, direction, payload);
                }

                TranslationOutcome {
                    request_id: ctx.request_id.clone(),
                    model,
                    source,
                    target,
                    mode: TranslationMode::Translate,
                    direction: Some(direction),
                    unknown_fields: translated.unknown.unknown_fields,
                    unmapped_fields: translated.unmapped_fields,
                    dropped_fields: translated.dropped_fields,
                    payload: translated.payload,
                }
            }
        };

        let entry = ctx.log_entry(&outcome.unknown_fields, None);
        info!(
            request_id = %entry.request_id,
            model = %outcome.model,
            direction = ?entry.direction,
            mode = %outcome.mode,
            unknown_fields = ?entry.unknown_fields,
            duration_us = entry.duration_us,
            "Translated payload"
        );
        self.logger.log_translation(&entry);

        Ok(outcome)
    }

    fn fail(&self, ctx: &TranslationContext, error: BridgeError) -> BridgeError {
        let entry = ctx.log_entry(&[], Some(&error));
        warn!(
            request_id = %entry.request_id,
            model = ?entry.model,
            direction = ?entry.direction,
            error_kind = error.kind(),
            duration_us = entry.duration_us,
            "Translation failed: {}",
            error
        );
        self.logger.log_translation(&entry);
        error
    }

    /// Round-trip a copy of the request and report divergence. Never affects the
    /// served payload.
    fn shadow(&self, request_id: &str, direction: TranslationDirection, payload: &Value) {
        let result = roundtrip::verify(payload, direction);
        if result.success {
            return;
        }

        warn!(
            request_id = %request_id,
            direction = %direction,
            differences = ?result.differences,
            "Shadow round trip diverged"
        );
        self.logger.log_with_context(
            LogLevel::Warn,
            TRANSLATION_COMPONENT,
            format!(
                "{} {} shadow round trip diverged: {}",
                request_id,
                direction,
                result.differences.join("; ")
            ),
            serde_json::json!({
                "request_id": request_id,
                "direction": direction,
                "differences": result.differences,
                "semantic_equivalence": result.semantic_equivalence,
            }),
        );
    }
}

/// The routing key of a request payload.
fn request_model(dialect: ApiType, payload: &Value) -> Result<String> {
    match payload.get("model") {
        Some(Value::String(model)) => Ok(model.clone()),
        Some(_) => Err(BridgeError::schema(dialect, "model", "model must be a string")),
        None => Err(BridgeError::schema(dialect, "model", "missing required field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ModelMapping;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> TranslationEngine {
        let mut mapping = ModelMapping::new();
        mapping.insert("o3".to_string(), ApiType::Response);
        mapping.insert("gpt-4o".to_string(), ApiType::ChatCompletions);
        let logger = SharedLogger::new(dir.path().join("bridge.log")).unwrap();
        TranslationEngine::new(Arc::new(ModelRouter::new(mapping)), logger)
    }

    #[test]
    fn test_chat_client_to_response_backend() {
        let dir = TempDir::new().unwrap();
        let outcome = engine(&dir)
            .translate_request(
                ApiType::ChatCompletions,
                &json!({
                    "model": "o3",
                    "messages": [{"role": "system", "content": "S"}, {"role": "user", "content": "u"}],
                    "n": 2,
                    "seed": 7
                }),
                Some("req-1".to_string()),
            )
            .unwrap();

        assert_eq!(outcome.request_id, "req-1");
        assert_eq!(outcome.direction, Some(TranslationDirection::ChatToResponse));
        assert_eq!(outcome.target, ApiType::Response);
        assert_eq!(outcome.payload["instructions"], json!("S"));
        assert_eq!(outcome.unknown_fields, vec!["seed"]);
        assert_eq!(outcome.unmapped_fields, vec!["n"]);
    }

    #[test]
    fn test_same_dialect_passes_through_unchanged() {
        let dir = TempDir::new().unwrap();
        let payload = json!({"model": "gpt-4o", "messages": [], "weird": {"x": null}});
        let outcome = engine(&dir)
            .translate_request(ApiType::ChatCompletions, &payload, None)
            .unwrap();

        assert_eq!(outcome.mode, TranslationMode::PassThrough);
        assert_eq!(outcome.direction, None);
        assert_eq!(outcome.payload, payload);
        assert_eq!(outcome.unknown_fields, vec!["weird"]);
    }

    #[test]
    fn test_unrouted_model_is_rejected_and_logged() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let err = engine
            .translate_request(
                ApiType::Response,
                &json!({"model": "unknown", "input": "hi"}),
                Some("req-9".to_string()),
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::ModelNotFound { .. }));

        let entry = &engine.logger.recent(1)[0];
        assert_eq!(entry.level, LogLevel::Error);
        let context = entry.context.as_ref().unwrap();
        assert_eq!(context["request_id"], json!("req-9"));
        assert_eq!(context["success"], json!(false));
        assert_eq!(context["model"], json!("unknown"));
    }

    #[test]
    fn test_missing_model_is_schema_violation() {
        let dir = TempDir::new().unwrap();
        let err = engine(&dir)
            .translate_request(ApiType::ChatCompletions, &json!({"messages": []}), None)
            .unwrap_err();
        assert!(matches!(err, BridgeError::SchemaViolation { ref field, .. } if field == "model"));
    }

    #[test]
    fn test_response_body_goes_back_to_client_dialect() {
        let dir = TempDir::new().unwrap();
        let outcome = engine(&dir)
            .translate_response(
                ApiType::ChatCompletions,
                "o3",
                &json!({
                    "id": "resp_1",
                    "object": "response",
                    "created_at": 3,
                    "model": "o3-2025-04-16",
                    "status": "completed",
                    "output": [{
                        "type": "message", "id": "msg_resp_1", "role": "assistant",
                        "content": [{"type": "output_text", "text": "hey", "annotations": []}]
                    }]
                }),
                None,
            )
            .unwrap();

        assert_eq!(outcome.source, ApiType::Response);
        assert_eq!(outcome.direction, Some(TranslationDirection::ResponseToChatResponse));
        assert_eq!(outcome.payload["choices"][0]["message"]["content"], json!("hey"));
        assert_eq!(outcome.payload["model"], json!("o3-2025-04-16"));
    }

    #[test]
    fn test_unknown_fields_emit_diagnostic_event() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        engine
            .translate_request(
                ApiType::Response,
                &json!({"model": "gpt-4o", "input": "hi", "store": true}),
                None,
            )
            .unwrap();

        let recent = engine.logger.recent(2);
        assert_eq!(recent[0].level, LogLevel::Info);
        assert_eq!(recent[1].level, LogLevel::Warn);
        assert!(recent[1].message.contains("store"));
    }

    #[test]
    fn test_shadow_verify_logs_divergence_without_touching_payload() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir).with_shadow_verify(true);
        let outcome = engine
            .translate_request(
                ApiType::ChatCompletions,
                &json!({
                    "model": "o3",
                    "messages": [{"role": "system", "content": "S"}],
                    "instructions": "shadowed"
                }),
                None,
            )
            .unwrap();

        assert_eq!(outcome.payload["instructions"], json!("S"));
        assert_eq!(outcome.dropped_fields, vec!["instructions"]);
        assert!(engine
            .logger
            .recent(5)
            .iter()
            .any(|e| e.message.contains("shadow round trip diverged")));
    }
}
