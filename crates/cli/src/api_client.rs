//! # API Client
//!
//! A client for the `cupom-server` HTTP API.

use crate::{image::read_image, ui};
use anyhow::{bail, Result};
use clap::Parser;
use reqwest::{multipart, Client};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// The receipt image to upload
    #[arg(required = true)]
    image: PathBuf,
    /// Base URL of the cupom server
    #[arg(long, env = "CUPOM_SERVER_URL", default_value = "http://localhost:8000")]
    server: String,
    /// Print a readable summary instead of JSON
    #[arg(long)]
    summary: bool,
}

/// The client for making API calls to the `cupom-server`.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Uploads an image to `POST /processar_cupom` and returns the JSON body.
    pub async fn process_receipt(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<Value> {
        let url = format!("{}/processar_cupom", self.base_url);
        info!("Uploading '{}' to: {}", file_name, url);

        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|body| body["detail"].as_str().map(str::to_string))
                .unwrap_or(error_text);
            bail!("Server responded with {}: {}", status, detail);
        }

        Ok(response.json().await?)
    }
}

pub async fn handle_send(args: &SendArgs) -> Result<()> {
    let image = read_image(&args.image).await?;
    let client = ApiClient::new(&args.server);

    let body = client
        .process_receipt(&image.file_name, image.mime_type, image.data)
        .await?;

    if args.summary {
        print!("{}", ui::render_summary(&body));
    } else {
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}
