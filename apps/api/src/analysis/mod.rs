// Resume analysis: image intake, resume field extraction, fit evaluation.
// All LLM calls go through llm_client::CompletionBackend; all parsing of model
// output goes through crate::extraction.

use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

pub mod evaluation;
pub mod handlers;
pub mod image;
pub mod pipeline;
pub mod prompts;
pub mod resume;

/// Failure of one analysis request. Upstream and extraction failures stay distinct.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("completion call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("could not build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}
