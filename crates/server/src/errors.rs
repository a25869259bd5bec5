use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use cupom::ExtractionError;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates the failures a request can hit before or around the
/// model call, so they can be converted into HTTP responses. A model reply
/// that is not valid JSON is not an error; it is returned with status 200.
pub enum AppError {
    /// Errors originating from the `cupom` extractor.
    Extraction(ExtractionError),
    /// The uploaded part is not an `image/*`.
    NotAnImage,
    /// The form has no `file` part.
    MissingFile,
    /// The multipart body could not be read.
    Multipart(MultipartError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `ExtractionError` to `AppError`.
impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

/// Conversion from `MultipartError` to `AppError`.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, detail) = match self {
            AppError::Extraction(err) => {
                // Log the original error for debugging purposes
                error!("ExtractionError: {:?}", err);
                let status_code = match err {
                    ExtractionError::AiRequest(_)
                    | ExtractionError::AiDeserialization(_)
                    | ExtractionError::AiApi(_) => StatusCode::BAD_GATEWAY,
                    ExtractionError::ReqwestClientBuild(_)
                    | ExtractionError::ProviderConfiguration(_)
                    | ExtractionError::InvalidTolerance(_)
                    | ExtractionError::TempFile(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status_code,
                    format!("Erro interno ao processar a imagem: {err}"),
                )
            }
            AppError::NotAnImage => (
                StatusCode::BAD_REQUEST,
                "Arquivo deve ser uma imagem".to_string(),
            ),
            AppError::MissingFile => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Campo 'file' ausente no formulário".to_string(),
            ),
            AppError::Multipart(err) => {
                warn!("Rejected multipart body: {}", err);
                (err.status(), err.body_text())
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Erro interno ao processar a imagem: {err}"),
                )
            }
        };

        let body = Json(json!({
            "detail": detail,
        }));

        (status_code, body).into_response()
    }
}
