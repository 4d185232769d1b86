//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::analysis::evaluation::{evaluate_resume, Evaluation};
use crate::analysis::image::ResumeImage;
use crate::analysis::pipeline::{analyze, AnalysisReport};
use crate::analysis::resume::ResumeFields;
use crate::errors::AppError;
use crate::state::AppState;

const MISSING_INPUT: &str = "Please upload a resume and enter a job title.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub resume: ResumeFields,
    pub job_title: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub candidate_name: String,
    pub evaluation: Evaluation,
}

/// Uploaded file and job text read off a multipart form.
#[derive(Default)]
struct AnalyzeForm {
    file_name: Option<String>,
    resume: Option<Bytes>,
    job_title: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart form: `resume` (JPG/PNG file) and `job_title` (`job_description` also accepted).
/// Extracts resume fields from the image, then scores them against the job.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;

    let job_title = form.job_title.trim();
    let data = match form.resume {
        Some(data) if !job_title.is_empty() => data,
        _ => return Err(AppError::Validation(MISSING_INPUT.to_string())),
    };

    let image = ResumeImage::from_upload(
        form.file_name.as_deref(),
        data,
        state.config.max_upload_bytes,
    )?;

    let report = analyze(state.backend.as_ref(), &image, job_title).await?;
    Ok(Json(report))
}

/// POST /api/v1/evaluate
///
/// Scores already-extracted resume fields against a job, without another image call.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let job_title = request.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }

    let evaluation = evaluate_resume(state.backend.as_ref(), &request.resume, job_title).await?;

    Ok(Json(EvaluateResponse {
        candidate_name: request.resume.candidate_name().to_string(),
        evaluation,
    }))
}

async fn read_form(mut multipart: Multipart, limit: usize) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();
    let to_app_error = |e: MultipartError| upload_error(e, limit);

    while let Some(field) = multipart.next_field().await.map_err(to_app_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "resume" => {
                form.file_name = field.file_name().map(str::to_string);
                form.resume = Some(field.bytes().await.map_err(to_app_error)?);
            }
            "job_title" | "job_description" => {
                form.job_title = field.text().await.map_err(to_app_error)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

/// The body limit surfaces mid-stream as a multipart error carrying 413.
fn upload_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "The uploaded resume is over the {limit} byte limit"
        ))
    } else {
        AppError::Validation(format!("Malformed upload: {err}"))
    }
}
