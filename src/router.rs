//! Model routing: which dialect each configured backend model speaks.
//!
//! The table is validated once at startup (see [`crate::config::BridgeConfig::model_mapping`])
//! and is read-only afterwards, so it can be shared behind an `Arc` without locking.

use indexmap::IndexMap;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::translate::dialect::ApiType;

/// Validated model name -> backend dialect table, in configuration order.
pub type ModelMapping = IndexMap<String, ApiType>;

#[derive(Debug, Clone, Default)]
pub struct ModelRouter {
    mapping: ModelMapping,
}

impl ModelRouter {
    #[must_use]
    pub fn new(mapping: ModelMapping) -> Self {
        Self { mapping }
    }

    /// Validate the config's `[models]` table and build a router from it.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Ok(Self::new(config.model_mapping()?))
    }

    /// Backend dialect for `model`. Model names are matched exactly.
    pub fn resolve(&self, model: &str) -> Result<ApiType> {
        self.mapping
            .get(model)
            .copied()
            .ok_or_else(|| BridgeError::model_not_found(model))
    }

    #[must_use]
    pub fn contains(&self, model: &str) -> bool {
        self.mapping.contains_key(model)
    }

    #[must_use]
    pub fn list_models(&self) -> Vec<&str> {
        self.mapping.keys().map(String::as_str).collect()
    }

    /// Every routed model with its dialect, in configuration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ApiType)> {
        self.mapping.iter().map(|(model, api)| (model.as_str(), *api))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
