pub mod local;
pub mod ollama;

use crate::errors::ExtractionError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::time::Duration;

pub use local::LocalAiProvider;
pub use ollama::OllamaProvider;

/// An image sent to the model together with the prompt.
#[derive(Clone, Debug)]
pub struct ImageAttachment {
    /// The MIME type reported by the uploader, e.g. `image/jpeg`.
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// The raw bytes as standard base64, the encoding both model APIs expect.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }
}

/// A trait for interacting with a vision-capable model server.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Sends the prompts and images to the model and returns its text reply.
    ///
    /// An empty `system_prompt` means no system message is sent.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<String, ExtractionError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Builds the HTTP client shared by the providers.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, ExtractionError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(ExtractionError::ReqwestClientBuild)
}
