//! # AI Provider Factory
//!
//! This module centralizes the logic for creating the vision model client from
//! configuration. Placing it in the `lib` crate lets both the server and the
//! CLI build providers the same way.

use crate::{
    constants::{DEFAULT_MODEL, DEFAULT_OLLAMA_CHAT_URL},
    errors::ExtractionError,
    providers::ai::{AiProvider, LocalAiProvider, OllamaProvider},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// The kind of model server to talk to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A local Ollama server (`/api/chat`).
    #[default]
    Ollama,
    /// Any OpenAI-compatible `chat/completions` endpoint.
    Local,
}

/// Connection settings for the vision model.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// The chat endpoint. Required for `local`; defaults to the local Ollama
    /// chat URL for `ollama`.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Overall timeout for one model call. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_url: None,
            api_key: None,
            model_name: default_model_name(),
            temperature: None,
            timeout_secs: None,
        }
    }
}

/// Instantiates the provider described by `config`.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, ExtractionError> {
    let timeout = config.timeout_secs.map(Duration::from_secs);
    let api_url = config.api_url.clone().filter(|url| !url.trim().is_empty());

    let provider: Box<dyn AiProvider> = match config.provider {
        ProviderKind::Ollama => {
            let api_url = api_url.unwrap_or_else(|| DEFAULT_OLLAMA_CHAT_URL.to_string());
            info!(
                "Configuring Ollama provider with URL: {} (model '{}')",
                api_url, config.model_name
            );
            Box::new(OllamaProvider::new(
                api_url,
                config.model_name.clone(),
                config.temperature,
                timeout,
            )?)
        }
        ProviderKind::Local => {
            let api_url = api_url.ok_or_else(|| {
                ExtractionError::ProviderConfiguration(
                    "api_url is required for the 'local' provider".to_string(),
                )
            })?;
            info!(
                "Configuring Local AI provider with URL: {} (model '{}')",
                api_url, config.model_name
            );
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                Some(config.model_name.clone()),
                config.temperature,
                timeout,
            )?)
        }
    };

    Ok(provider)
}
