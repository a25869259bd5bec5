//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state is read-only after startup; each
//! request stages its own upload, so handlers share nothing mutable.

use crate::config::AppConfig;
use cupom::{providers::factory::create_provider, ReceiptExtractor, ReceiptExtractorBuilder};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The receipt extractor wired to the configured vision model.
    pub extractor: Arc<ReceiptExtractor>,
}

/// Builds the shared application state from the configuration.
///
/// Instantiates the AI provider described in the `provider` section and wraps
/// it in a `ReceiptExtractor` with the configured prompts and tolerance.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_provider(&config.provider)?;

    let mut builder = ReceiptExtractorBuilder::new()
        .ai_provider(ai_provider)
        .system_prompt(config.prompts.system_prompt.clone())
        .user_prompt(config.prompts.user_prompt.clone())
        .tolerance(config.sum_tolerance);
    if let Some(temp_dir) = &config.temp_dir {
        builder = builder.temp_dir(temp_dir);
    }
    let extractor = builder.build()?;

    info!(
        model = %config.provider.model_name,
        tolerance = config.sum_tolerance,
        "Initialized receipt extractor."
    );

    Ok(AppState {
        config: Arc::new(config),
        extractor: Arc::new(extractor),
    })
}
