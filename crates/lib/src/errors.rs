use thiserror::Error;

/// Errors raised while turning an uploaded receipt image into an extraction.
///
/// Malformed model output is *not* an error: it becomes an
/// [`Extraction::ParseFailure`](crate::types::Extraction::ParseFailure).
/// Only failures around the model call and the temp file end up here.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is misconfigured: {0}")]
    ProviderConfiguration(String),
    #[error("Sum tolerance must be a non-negative number, got {0}")]
    InvalidTolerance(f64),
    #[error("Temporary image file error: {0}")]
    TempFile(#[from] std::io::Error),
}

/// The model reply could not be decoded as JSON.
#[derive(Error, Debug)]
#[error("invalid JSON: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);
