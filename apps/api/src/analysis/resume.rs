//! Resume field extraction — one vision call, then the extraction pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::image::ResumeImage;
use crate::analysis::prompts::{RESUME_EXTRACT_INSTRUCTION, RESUME_EXTRACT_ROLE};
use crate::analysis::AnalysisError;
use crate::extraction::{extract, Extract, FieldKind, FieldSpec, SchemaDescriptor};
use crate::llm_client::prompts::json_only_system;
use crate::llm_client::CompletionBackend;

/// Display name used when the resume yields no name. Substituted by callers, never by extraction.
pub const CANDIDATE_PLACEHOLDER: &str = "The candidate";

pub const RESUME_FIELDS_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "resume fields",
    fields: &[
        FieldSpec::default_empty("name", FieldKind::Text),
        FieldSpec::default_empty("email", FieldKind::Text),
        FieldSpec::default_empty("phone", FieldKind::Text),
        FieldSpec::default_empty("skills", FieldKind::TextList),
        FieldSpec::default_empty("education", FieldKind::Entries),
        FieldSpec::default_empty("experience", FieldKind::Entries),
    ],
};

/// One education or experience entry: free text, or labelled text details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumeEntry {
    Text(String),
    Details(BTreeMap<String, String>),
}

/// Fields read off a resume. Absent fields are empty, never placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub education: Vec<ResumeEntry>,
    pub experience: Vec<ResumeEntry>,
}

impl Extract for ResumeFields {
    const SCHEMA: &'static SchemaDescriptor = &RESUME_FIELDS_SCHEMA;
}

impl ResumeFields {
    /// The extracted name, or `CANDIDATE_PLACEHOLDER` when the resume had none.
    pub fn candidate_name(&self) -> &str {
        match self.name.trim() {
            "" => CANDIDATE_PLACEHOLDER,
            name => name,
        }
    }
}

/// Sends the resume image to the vision model and extracts `ResumeFields` from its answer.
pub async fn extract_resume_fields(
    backend: &dyn CompletionBackend,
    image: &ResumeImage,
) -> Result<ResumeFields, AnalysisError> {
    let system = json_only_system(RESUME_EXTRACT_ROLE);
    let raw = backend
        .complete_with_image(&system, RESUME_EXTRACT_INSTRUCTION, &image.attachment())
        .await?;

    let fields: ResumeFields = extract(raw)?;
    debug!(
        "Extracted resume fields: {} skills, {} education, {} experience entries",
        fields.skills.len(),
        fields.education.len(),
        fields.experience.len()
    );
    Ok(fields)
}
