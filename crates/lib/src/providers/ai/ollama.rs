use crate::{
    errors::ExtractionError,
    providers::ai::{build_client, AiProvider, ImageAttachment},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- Ollama `/api/chat` request and response structures ---

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OllamaMessage {
    role: String,
    content: String,
    /// Base64-encoded images, without a data URL prefix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

// --- Ollama Provider implementation ---

/// A provider for a local Ollama server hosting a vision model.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider` for the chat endpoint at `api_url`.
    pub fn new(
        api_url: String,
        model: String,
        temperature: Option<f32>,
        timeout: Option<Duration>,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<String, ExtractionError> {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
                images: Vec::new(),
            });
        }
        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: user_prompt.to_string(),
            images: images.iter().map(ImageAttachment::to_base64).collect(),
        });

        let request_body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.temperature.map(|temperature| OllamaOptions { temperature }),
        };

        debug!(model = %self.model, images = images.len(), "Sending request to Ollama");

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(ExtractionError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::AiApi(format!("{status}: {error_text}")));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(ExtractionError::AiDeserialization)?;

        Ok(chat_response.message.content)
    }
}
