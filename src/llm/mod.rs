pub mod chat;
pub mod error;
pub mod fallback;

use crate::cli::Args;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Generation parameters forwarded to the backend as the `options` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    #[serde(rename = "num_predict")]
    pub max_tokens: u32,
    pub repeat_penalty: f32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_tokens: 2048,
            repeat_penalty: 1.1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid inference backend URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported inference backend URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

/// Inference backend settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Whether replies come from the backend at all. Derived from the explicit
    /// toggle or the presence of a credential, never re-derived per call.
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub sampling: SamplingOptions,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            model: "llama2".to_string(),
            timeout: Duration::from_secs(120),
            sampling: SamplingOptions::default(),
        }
    }
}

impl BackendConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let base_url = validate_base_url(&args.ollama_api_url)?;
        let api_key = Some(args.ollama_api_key.trim().to_string()).filter(|k| !k.is_empty());

        Ok(Self {
            enabled: args.use_ollama || api_key.is_some(),
            base_url,
            api_key,
            model: args.ollama_model.clone(),
            timeout: Duration::from_secs(args.ollama_timeout_secs),
            sampling: SamplingOptions {
                temperature: args.temperature,
                top_p: args.top_p,
                top_k: args.top_k,
                max_tokens: args.num_predict,
                repeat_penalty: args.repeat_penalty,
            },
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.trim_end_matches('/').to_string()),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
