use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Sheets error: {0}")]
    Sheets(String),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Sheets(ref e) => {
                tracing::error!("Sheets error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Catalog source error".to_string(),
                )
            }
            AppError::Ai(ref e) => {
                tracing::error!("AI error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI generation error".to_string(),
                )
            }
            AppError::Tts(ref e) => {
                tracing::error!("TTS error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Speech synthesis error".to_string(),
                )
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
