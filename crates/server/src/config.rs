//! # Application Configuration
//!
//! This module defines the configuration structure for the `cupom-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables. Every key has a default, so the server also starts with no file.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use cupom::{
    constants::DEFAULT_SUM_TOLERANCE,
    prompts::{RECEIPT_EXTRACTION_PROMPT, RECEIPT_EXTRACTION_SYSTEM_PROMPT},
    providers::factory::ProviderConfig,
};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The interface to bind. Loaded from `HOST` env var.
    #[serde(default = "default_host")]
    pub host: String,
    /// Maximum accepted gap between the summed line totals and `valor_total`.
    #[serde(default = "default_sum_tolerance")]
    pub sum_tolerance: f64,
    /// Upper bound for the multipart request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Where uploads are staged. The system temp dir when unset.
    #[serde(default)]
    pub temp_dir: Option<String>,
    /// The vision model server.
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

/// Prompts sent with every receipt image.
#[derive(Debug, Deserialize, Clone)]
pub struct PromptsConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            user_prompt: default_user_prompt(),
        }
    }
}

fn default_port() -> u16 {
    8000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_sum_tolerance() -> f64 {
    DEFAULT_SUM_TOLERANCE
}

/// Provides a default upload limit of 10 MiB.
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_system_prompt() -> String {
    RECEIPT_EXTRACTION_SYSTEM_PROMPT.to_string()
}

fn default_user_prompt() -> String {
    RECEIPT_EXTRACTION_PROMPT.to_string()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Resolves which YAML file to load, if any.
///
/// An explicit path (argument or `CONFIG_PATH`) must exist; the default
/// `config.yml` next to the crate manifest is optional.
fn resolve_config_path(config_path_override: Option<&str>) -> (String, bool) {
    if let Some(path) = config_path_override {
        return (path.to_string(), true);
    }
    match env::var("CONFIG_PATH") {
        Ok(path) if !path.is_empty() => (path, true),
        _ => (format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")), false),
    }
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `host` are overridden by `PORT` and `HOST`.
/// - Nested keys are overridden by `CUPOM_...` variables
///   (e.g., `CUPOM_PROVIDER__MODEL_NAME`).
/// - `${VAR}` placeholders inside the YAML file are replaced from the environment.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    // Layer 1: Programmatic defaults from the library.
    let mut builder = ConfigBuilder::builder()
        .set_default("prompts.user_prompt", RECEIPT_EXTRACTION_PROMPT)?
        .set_default("prompts.system_prompt", RECEIPT_EXTRACTION_SYSTEM_PROMPT)?;

    // Layer 2: YAML file.
    let (path, required) = resolve_config_path(config_path_override);
    match read_and_substitute(&path)? {
        Some(content) => {
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if required => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{path}'."
            )));
        }
        None => info!("'{path}' not found. Using defaults and environment variables."),
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("CUPOM")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;

    if config.sum_tolerance.is_nan() || config.sum_tolerance < 0.0 {
        return Err(ConfigError::General(format!(
            "sum_tolerance must be a non-negative number, got {}",
            config.sum_tolerance
        )));
    }

    Ok(config)
}
