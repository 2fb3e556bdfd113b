//! Per-call translation context.
//!
//! Carries the correlation id and timing for one translation so the outcome can be
//! logged with the direction that was actually taken.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::logging::TranslationLogEntry;
use crate::translate::dialect::{PayloadKind, Resolution, TranslationDirection, TranslationMode};

#[derive(Debug, Clone)]
pub struct TranslationContext {
    /// Caller-supplied id, or a fresh uuid.
    pub request_id: String,
    pub kind: PayloadKind,
    pub model: Option<String>,
    /// Unset until direction resolution has run.
    pub resolution: Option<Resolution>,
    pub start_time: Instant,
}

impl TranslationContext {
    pub fn new(request_id: Option<String>, kind: PayloadKind) -> Self {
        Self {
            request_id: request_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind,
            model: None,
            resolution: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// `None` for pass-through and for calls that failed before resolution.
    pub fn direction(&self) -> Option<TranslationDirection> {
        self.resolution.and_then(Resolution::direction)
    }

    pub fn mode(&self) -> Option<TranslationMode> {
        self.resolution.map(Resolution::mode)
    }

    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Build the sink record for this call.
    pub fn log_entry(&self, unknown_fields: &[String], error: Option<&BridgeError>) -> TranslationLogEntry {
        TranslationLogEntry {
            request_id: self.request_id.clone(),
            kind: self.kind,
            model: self.model.clone(),
            direction: self.direction(),
            mode: self.mode(),
            unknown_fields: unknown_fields.to_vec(),
            timestamp: Utc::now(),
            duration_us: self.elapsed_us(),
            success: error.is_none(),
            error: error.map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_request_id_when_absent() {
        let a = TranslationContext::new(None, PayloadKind::Request);
        let b = TranslationContext::new(Some("  ".to_string()), PayloadKind::Request);
        assert_eq!(a.request_id.len(), 36);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_keeps_caller_request_id() {
        let ctx = TranslationContext::new(Some("req-7".to_string()), PayloadKind::Response);
        assert_eq!(ctx.request_id, "req-7");
    }

    #[test]
    fn test_direction_absent_for_pass_through() {
        let ctx = TranslationContext::new(None, PayloadKind::Request)
            .with_resolution(Resolution::PassThrough);
        assert_eq!(ctx.direction(), None);
        assert_eq!(ctx.mode(), Some(TranslationMode::PassThrough));
    }

    #[test]
    fn test_log_entry_records_failure() {
        let ctx = TranslationContext::new(Some("r".to_string()), PayloadKind::Request)
            .with_model("ghost");
        let err = BridgeError::model_not_found("ghost");
        let entry = ctx.log_entry(&[], Some(&err));

        assert!(!entry.success);
        assert_eq!(entry.mode, None);
        assert_eq!(entry.model.as_deref(), Some("ghost"));
        assert!(entry.error.unwrap().contains("ghost"));
    }

    #[test]
    fn test_log_entry_records_direction() {
        let ctx = TranslationContext::new(None, PayloadKind::Request)
            .with_resolution(Resolution::Translate(TranslationDirection::ChatToResponse));
        let entry = ctx.log_entry(&["seed".to_string()], None);

        assert!(entry.success);
        assert_eq!(entry.direction, Some(TranslationDirection::ChatToResponse));
        assert_eq!(entry.mode, Some(TranslationMode::Translate));
        assert_eq!(entry.unknown_fields, vec!["seed"]);
    }
}
