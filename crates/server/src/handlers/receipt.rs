//! # Receipt Processing Handler
//!
//! `POST /processar_cupom` accepts a multipart form with a `file` part holding
//! the receipt photo and answers with the extracted JSON.

use super::{AppError, AppState};
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use cupom::Extraction;
use tracing::{info, warn};

/// An image part pulled out of the multipart form.
struct UploadedImage {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Extracts the receipt fields from an uploaded image.
///
/// The body is the decoded model reply, annotated with `aviso_soma` when the
/// item totals disagree with `valor_total`, or a `raw_response`/`error` pair
/// when the model did not answer with JSON. Both are successful responses.
pub async fn process_receipt_handler(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Extraction>, AppError> {
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                // Reject before buffering the body.
                let content_type = match field.content_type() {
                    Some(ct) if ct.starts_with("image/") => ct.to_string(),
                    other => {
                        warn!("Rejected upload with content type {:?}", other);
                        return Err(AppError::NotAnImage);
                    }
                };
                let file_name = field.file_name().unwrap_or("cupom").to_string();
                let data = field.bytes().await?.to_vec();
                info!(
                    "Received receipt image '{}' ({}, {} bytes)",
                    file_name,
                    content_type,
                    data.len()
                );
                upload = Some(UploadedImage {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => warn!("Ignoring unknown multipart field: {}", name),
        }
    }

    let upload = upload.ok_or(AppError::MissingFile)?;

    let extraction = app_state
        .extractor
        .process_image(&upload.data, &upload.content_type)
        .await?;

    if extraction.is_parse_failure() {
        warn!(
            "Model reply for '{}' was not valid JSON; returning raw response.",
            upload.file_name
        );
    }

    Ok(Json(extraction))
}
