use crate::{image::read_image, ui};
use anyhow::Result;
use clap::Parser;
use cupom::{
    constants::{DEFAULT_MODEL, DEFAULT_SUM_TOLERANCE},
    providers::factory::{create_provider, ProviderConfig, ProviderKind},
    ReceiptExtractorBuilder,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// The receipt image to extract
    #[arg(required = true)]
    image: PathBuf,
    /// The vision model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    /// The chat endpoint of the model server
    #[arg(long, env = "CUPOM_PROVIDER__API_URL")]
    api_url: Option<String>,
    /// The API dialect spoken by the model server: `ollama` or `local`
    #[arg(long, default_value = "ollama", value_parser = parse_provider)]
    provider: ProviderKind,
    /// Bearer key for OpenAI-compatible servers
    #[arg(long, env = "CUPOM_PROVIDER__API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Accepted gap between the summed items and the declared total
    #[arg(long, default_value_t = DEFAULT_SUM_TOLERANCE)]
    tolerance: f64,
    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print a readable summary instead of JSON
    #[arg(long)]
    summary: bool,
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "ollama" => Ok(ProviderKind::Ollama),
        "local" => Ok(ProviderKind::Local),
        other => Err(format!("unknown provider '{other}' (expected ollama or local)")),
    }
}

pub async fn handle_process(args: &ProcessArgs) -> Result<()> {
    let image = read_image(&args.image).await?;
    info!(
        "Processing '{}' ({}, {} bytes)",
        image.file_name,
        image.mime_type,
        image.data.len()
    );

    let provider_config = ProviderConfig {
        provider: args.provider,
        api_url: args.api_url.clone(),
        api_key: args.api_key.clone(),
        model_name: args.model.clone(),
        temperature: None,
        timeout_secs: args.timeout_secs,
    };
    let extractor = ReceiptExtractorBuilder::new()
        .ai_provider(create_provider(&provider_config)?)
        .tolerance(args.tolerance)
        .build()?;

    let extraction = extractor
        .process_image(&image.data, image.mime_type)
        .await?;

    if args.summary {
        print!("{}", ui::render_summary(&extraction.into_value()));
    } else {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    }
    Ok(())
}
