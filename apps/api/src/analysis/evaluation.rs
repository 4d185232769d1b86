//! Fit evaluation — scores extracted resume fields against a job title or description.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_ROLE};
use crate::analysis::resume::ResumeFields;
use crate::analysis::AnalysisError;
use crate::extraction::{extract, Extract, FieldKind, FieldSpec, SchemaDescriptor};
use crate::llm_client::prompts::json_only_system;
use crate::llm_client::CompletionBackend;

/// Categorical fit level. The three names are the only accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Good,
    Average,
    Poor,
}

impl Level {
    pub const NAMES: &'static [&'static str] = &["Good", "Average", "Poor"];

    /// Band implied by a score: Good 75+, Average 50–74, Poor below 50.
    pub fn for_score(score: f64) -> Self {
        if score >= 75.0 {
            Level::Good
        } else if score >= 50.0 {
            Level::Average
        } else {
            Level::Poor
        }
    }
}

pub const EVALUATION_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "evaluation",
    fields: &[
        FieldSpec::required(
            "score",
            FieldKind::Score {
                min: 0.0,
                max: 100.0,
            },
        ),
        FieldSpec::required("level", FieldKind::OneOf(Level::NAMES)),
        FieldSpec::required("remarks", FieldKind::Text),
        FieldSpec::optional("improvements", FieldKind::TextList),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: f64,
    pub level: Level,
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<Vec<String>>,
}

impl Extract for Evaluation {
    const SCHEMA: &'static SchemaDescriptor = &EVALUATION_SCHEMA;
}

/// Renders the evaluation prompt for a resume and job.
pub fn build_evaluation_prompt(
    resume: &ResumeFields,
    job_title: &str,
) -> Result<String, serde_json::Error> {
    let resume_json = serde_json::to_string_pretty(resume)?;
    Ok(fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("{resume_json}", resume_json.as_str()),
            ("{job_title}", job_title),
            ("{candidate_name}", resume.candidate_name()),
        ],
    ))
}

/// Single left-to-right pass: placeholder text inside substituted values is left as is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Asks the model to score `resume` against `job_title` and extracts an `Evaluation`.
///
/// A level that disagrees with the score band is logged and kept as returned.
pub async fn evaluate_resume(
    backend: &dyn CompletionBackend,
    resume: &ResumeFields,
    job_title: &str,
) -> Result<Evaluation, AnalysisError> {
    let prompt = build_evaluation_prompt(resume, job_title)?;
    let system = json_only_system(EVALUATION_ROLE);
    let raw = backend.complete_text(&system, &prompt).await?;

    let evaluation: Evaluation = extract(raw)?;
    let expected = Level::for_score(evaluation.score);
    if evaluation.level != expected {
        warn!(
            "Evaluation level {:?} disagrees with score {} (band {:?})",
            evaluation.level, evaluation.score, expected
        );
    }
    Ok(evaluation)
}
