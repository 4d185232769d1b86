//! End-to-end analysis: resume image → resume fields → evaluation, strictly in sequence.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::evaluation::{evaluate_resume, Evaluation};
use crate::analysis::image::ResumeImage;
use crate::analysis::resume::{extract_resume_fields, ResumeFields};
use crate::analysis::AnalysisError;
use crate::llm_client::CompletionBackend;

/// Result of one analysis request. Built per request and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub job_title: String,
    pub candidate_name: String,
    pub resume: ResumeFields,
    pub evaluation: Evaluation,
}

/// Runs both model calls for one upload. The second call never starts if the first fails.
pub async fn analyze(
    backend: &dyn CompletionBackend,
    image: &ResumeImage,
    job_title: &str,
) -> Result<AnalysisReport, AnalysisError> {
    let id = Uuid::new_v4();

    info!(
        %id,
        "Extracting resume fields ({}, {} bytes)",
        image.format().media_type(),
        image.size()
    );
    let resume = extract_resume_fields(backend, image)
        .await
        .inspect_err(|e| warn!(%id, "Resume extraction failed: {e}"))?;

    info!(%id, "Evaluating resume against '{job_title}'");
    let evaluation = evaluate_resume(backend, &resume, job_title)
        .await
        .inspect_err(|e| warn!(%id, "Evaluation failed: {e}"))?;

    info!(%id, score = evaluation.score, level = ?evaluation.level, "Analysis complete");

    Ok(AnalysisReport {
        id,
        created_at: Utc::now(),
        job_title: job_title.to_string(),
        candidate_name: resume.candidate_name().to_string(),
        resume,
        evaluation,
    })
}
