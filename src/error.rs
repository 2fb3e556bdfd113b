//! Error types for the bridge.

use thiserror::Error;

use crate::translate::dialect::ApiType;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Model '{model}' is not present in the routing table")]
    ModelNotFound { model: String },

    #[error("Invalid model mapping: {}", .invalid.join("; "))]
    InvalidMapping { invalid: Vec<String> },

    #[error("Schema violation in {dialect} payload at '{field}': {message}")]
    SchemaViolation {
        dialect: ApiType,
        field: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BridgeError {
    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            model: model.into(),
        }
    }

    pub fn schema(dialect: ApiType, field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SchemaViolation {
            dialect,
            field: field.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Short machine-readable tag used in log entries and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelNotFound { .. } => "model_not_found",
            Self::InvalidMapping { .. } => "invalid_mapping",
            Self::SchemaViolation { .. } => "schema_violation",
            Self::Config { .. } => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "invalid_json",
            Self::Toml(_) => "config_error",
        }
    }

    /// Whether the failure was caused by the caller's payload rather than the bridge.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound { .. } | Self::SchemaViolation { .. } | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
