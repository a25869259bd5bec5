//! # Receipt Extractor
//!
//! Orchestrates one extraction: the uploaded image is staged in a temporary
//! file, sent to the vision model with the extraction prompt, and the reply is
//! sanitized and cross-checked.

use crate::{
    constants::{DEFAULT_SUM_TOLERANCE, RAW_RESPONSE_LOG_CHARS},
    errors::ExtractionError,
    prompts::{RECEIPT_EXTRACTION_PROMPT, RECEIPT_EXTRACTION_SYSTEM_PROMPT},
    providers::ai::{AiProvider, ImageAttachment},
    sanitize::sanitize_and_validate,
    types::Extraction,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Extracts receipt data from images with a configured vision model.
#[derive(Clone)]
pub struct ReceiptExtractor {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) system_prompt: String,
    pub(crate) user_prompt: String,
    pub(crate) tolerance: f64,
    pub(crate) temp_dir: Option<PathBuf>,
}

impl fmt::Debug for ReceiptExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptExtractor")
            .field("ai_provider", &self.ai_provider)
            .field("tolerance", &self.tolerance)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `ReceiptExtractor` instances.
///
/// Only the AI provider is required. Prompts default to the NFC-e extraction
/// prompt and the tolerance to one cent.
#[derive(Default)]
pub struct ReceiptExtractorBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    system_prompt: Option<String>,
    user_prompt: Option<String>,
    tolerance: Option<f64>,
    temp_dir: Option<PathBuf>,
}

impl ReceiptExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn user_prompt(mut self, user_prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(user_prompt.into());
        self
    }

    /// Sets the maximum accepted difference between the summed line totals
    /// and the declared total.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Sets the directory for staged uploads. Defaults to the system temp dir.
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    /// Builds the `ReceiptExtractor`.
    pub fn build(self) -> Result<ReceiptExtractor, ExtractionError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            ExtractionError::ProviderConfiguration("no AI provider was set".to_string())
        })?;

        let tolerance = self.tolerance.unwrap_or(DEFAULT_SUM_TOLERANCE);
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(ExtractionError::InvalidTolerance(tolerance));
        }

        Ok(ReceiptExtractor {
            ai_provider,
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| RECEIPT_EXTRACTION_SYSTEM_PROMPT.to_string()),
            user_prompt: self
                .user_prompt
                .unwrap_or_else(|| RECEIPT_EXTRACTION_PROMPT.to_string()),
            tolerance,
            temp_dir: self.temp_dir,
        })
    }
}

impl ReceiptExtractor {
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Runs one extraction over an uploaded image.
    ///
    /// The image is written to a fresh temporary file that is removed before
    /// returning, whether or not the model call succeeded. Only model and I/O
    /// failures are errors; an unparsable reply is an [`Extraction::ParseFailure`].
    pub async fn process_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<Extraction, ExtractionError> {
        let temp_file = self.create_temp_file(mime_type)?;
        let result = self
            .extract_from_staged_file(temp_file.path(), image_bytes, mime_type)
            .await;

        let temp_path = temp_file.path().to_path_buf();
        match temp_file.close() {
            Ok(()) => info!("Temporary file {} removed", temp_path.display()),
            Err(e) => warn!(
                "Failed to remove temporary file {}: {}",
                temp_path.display(),
                e
            ),
        }

        result
    }

    /// Sanitizes a raw model reply with this extractor's tolerance.
    pub fn sanitize(&self, raw_response: &str) -> Extraction {
        let extraction = sanitize_and_validate(raw_response, self.tolerance);
        match &extraction {
            Extraction::ParseFailure { error, .. } => {
                warn!("Failed to parse model reply as JSON: {}", error);
            }
            Extraction::Record { check, .. } => {
                if let Some(annotation) = check.annotation() {
                    warn!("Receipt totals cross-check: {}", annotation);
                }
            }
        }
        extraction
    }

    fn create_temp_file(&self, mime_type: &str) -> Result<NamedTempFile, ExtractionError> {
        let suffix = format!(".{}", file_extension(mime_type));
        let mut builder = tempfile::Builder::new();
        builder.prefix("temp_cupom_").suffix(&suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    async fn extract_from_staged_file(
        &self,
        path: &Path,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<Extraction, ExtractionError> {
        tokio::fs::write(path, image_bytes).await?;
        let size = tokio::fs::metadata(path).await?.len();
        info!(
            "Image staged at {} (size: {} bytes)",
            path.display(),
            size
        );

        let data = tokio::fs::read(path).await?;
        let image = ImageAttachment::new(mime_type, data);
        let raw_response = self
            .ai_provider
            .generate(&self.system_prompt, &self.user_prompt, &[image])
            .await?;

        let preview: String = raw_response.chars().take(RAW_RESPONSE_LOG_CHARS).collect();
        info!("Raw model reply (first {RAW_RESPONSE_LOG_CHARS} chars): {preview}...");

        Ok(self.sanitize(raw_response.trim()))
    }
}

/// Derives a file extension from an `image/*` MIME type, e.g. `image/jpeg` -> `jpeg`.
fn file_extension(mime_type: &str) -> String {
    let subtype = mime_type
        .split(';')
        .next()
        .and_then(|essence| essence.trim().strip_prefix("image/"))
        .unwrap_or("");
    let extension: String = subtype
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if extension.is_empty() {
        "img".to_string()
    } else {
        extension.to_ascii_lowercase()
    }
}
