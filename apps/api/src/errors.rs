use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::image::ImageError;
use crate::analysis::AnalysisError;
use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Upstream(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Upstream(e) => AppError::Upstream(e),
            AnalysisError::Extraction(e) => AppError::Extraction(e),
            AnalysisError::Prompt(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                AppError::PayloadTooLarge(msg) => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    msg.clone(),
                    None,
                ),
                AppError::Extraction(e) => match e.report() {
                    Some(report) => {
                        tracing::warn!(
                            stage = %report.stage,
                            raw_excerpt = %report.raw_excerpt,
                            "Model output rejected: {e}"
                        );
                        let (code, message) = match e {
                            ExtractionError::Syntax { .. } => (
                                "MODEL_OUTPUT_UNREADABLE",
                                "The assistant's answer could not be understood. Please retry.",
                            ),
                            _ => (
                                "MODEL_OUTPUT_INCOMPLETE",
                                "The assistant omitted required information or returned invalid values. Please retry.",
                            ),
                        };
                        (
                            StatusCode::BAD_GATEWAY,
                            code,
                            message.to_string(),
                            Some(json!({
                                "stage": report.stage,
                                "reason": report.message,
                                "raw_excerpt": report.raw_excerpt,
                            })),
                        )
                    }
                    None => {
                        tracing::error!("Extraction misconfigured: {e}");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_ERROR",
                            "An internal server error occurred".to_string(),
                            None,
                        )
                    }
                },
                AppError::Upstream(e) => {
                    tracing::error!("LLM error: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The AI service could not be reached or returned nothing. Please try again later."
                            .to_string(),
                        None,
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
