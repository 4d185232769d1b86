// All LLM prompt constants for the analysis module.
// Reuses the JSON-only rules from llm_client::prompts.

/// Role for resume field extraction. Combined with the JSON-only rules at call time.
pub const RESUME_EXTRACT_ROLE: &str =
    "You are a precise resume data extractor reading a photographed or scanned resume.";

/// Instruction sent with the resume image.
pub const RESUME_EXTRACT_INSTRUCTION: &str = r#"Extract the candidate's name, email, phone, skills, education and experience from this resume image.

Return a JSON object with exactly these keys:
{
  "name": "Jane Doe",
  "email": "jane@example.com",
  "phone": "+1 555 0100",
  "skills": ["Rust", "PostgreSQL"],
  "education": [
    {"degree": "BSc Computer Science", "institution": "State University", "years": "2015-2019"}
  ],
  "experience": [
    {"role": "Backend Engineer", "company": "Acme", "years": "2019-2024", "summary": "Built billing services"}
  ]
}

RULES:
1. Use an empty string or an empty list for anything not present on the resume. Never guess.
2. Education and experience entries are objects with string values only.
3. Copy text as written; do not summarize skills into categories."#;

/// Role for the fit evaluation. Combined with the JSON-only rules at call time.
pub const EVALUATION_ROLE: &str = "You are a professional resume evaluator \
    scoring resumes the way an applicant tracking system would.";

/// Evaluation prompt template.
/// Replace: {resume_json}, {job_title}, {candidate_name}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Given this resume data:

{resume_json}

And the target job: "{job_title}"

Your task:
1. Give an ATS score from 0 to 100.
2. Categorize the resume as Good (75+), Average (50-74), or Poor (below 50).
3. Write personalized remarks addressing the candidate as "{candidate_name}".
4. Suggest specific, actionable ways to improve the resume for this job.

Respond with this JSON object:
{
  "score": 72,
  "level": "Average",
  "remarks": "Overall opinion using the candidate's name",
  "improvements": ["suggestion 1", "suggestion 2"]
}

"level" MUST be exactly one of "Good", "Average", "Poor".
"score" MUST be a number, not a string."#;
