use crate::error::{BridgeError, Result};
use crate::router::ModelMapping;
use crate::translate::dialect::ApiType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dialect-bridge.toml";
const APP_DIR: &str = "dialect-bridge";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Model name -> backend dialect tag, kept in file order.
    #[serde(default)]
    pub models: IndexMap<String, String>,
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Round-trip every translated request and log a warning on divergence.
    #[serde(default)]
    pub shadow_verify: bool,
}

fn default_port() -> u16 {
    4300
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            models: IndexMap::new(),
            translation: TranslationConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        let candidates = config_search_paths();
        for candidate in &candidates {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        Err(BridgeError::config(format!(
            "No config file found. Searched: {}. Create one from dialect-bridge.example.toml",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Validate the `[models]` table into a routing mapping.
    ///
    /// Every entry is checked; all offending models are reported together in one
    /// `InvalidMapping` error rather than stopping at the first.
    pub fn model_mapping(&self) -> Result<ModelMapping> {
        let mut mapping = ModelMapping::new();
        let mut invalid = Vec::new();

        for (model, tag) in &self.models {
            if model.trim().is_empty() {
                invalid.push(format!("empty model name (mapped to '{tag}')"));
                continue;
            }
            match tag.parse::<ApiType>() {
                Ok(api_type) => {
                    mapping.insert(model.clone(), api_type);
                }
                Err(reason) => invalid.push(format!("{model}: {reason}")),
            }
        }

        if !invalid.is_empty() {
            return Err(BridgeError::InvalidMapping { invalid });
        }
        Ok(mapping)
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // CWD
    paths.push(PathBuf::from(CONFIG_FILE_NAME));

    // XDG / platform config dir
    if cfg!(target_os = "macos") {
        if let Some(home) = dirs_path() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join(APP_DIR)
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join(APP_DIR).join("config.toml"));
        }
        if let Some(home) = dirs_path() {
            paths.push(home.join(".config").join(APP_DIR).join("config.toml"));
        }
    }

    // Home directory fallback
    if let Some(home) = dirs_path() {
        paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
    }

    paths
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
