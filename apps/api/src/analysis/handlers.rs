//! Axum route handlers for the analysis API.
//!
//! A degraded model reply still returns 200; callers detect it by the
//! `error`/`raw_response` pair inside the payload.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::cover_letter::generate_cover_letter;
use crate::analysis::job_analyzer::analyze_job;
use crate::analysis::optimizer::optimize_resume;
use crate::analysis::resume_matcher::match_resume;
use crate::errors::AppError;
use crate::llm_client::ParsedReply;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub text: String,
}

/// Resume text plus the job description it is evaluated against.
#[derive(Debug, Deserialize)]
pub struct ResumeSubmission {
    pub text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub analysis: ParsedReply,
}

#[derive(Debug, Serialize)]
pub struct MatchResumeResponse {
    pub match_result: ParsedReply,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub suggestions: ParsedReply,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: ParsedReply,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl ResumeSubmission {
    fn validate(&self) -> Result<(), AppError> {
        require_text("text", &self.text)?;
        require_text("job_description", &self.job_description)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze-job
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<AnalyzeJobResponse>, AppError> {
    require_text("text", &request.text)?;

    let analysis = analyze_job(&request.text, &state.llm).await?;

    Ok(Json(AnalyzeJobResponse { analysis }))
}

/// POST /match-resume
pub async fn handle_match_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeSubmission>,
) -> Result<Json<MatchResumeResponse>, AppError> {
    request.validate()?;

    let match_result = match_resume(&request.text, &request.job_description, &state.llm).await?;

    Ok(Json(MatchResumeResponse { match_result }))
}

/// POST /optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<ResumeSubmission>,
) -> Result<Json<OptimizeResponse>, AppError> {
    request.validate()?;

    let suggestions =
        optimize_resume(&request.text, &request.job_description, &state.llm).await?;

    Ok(Json(OptimizeResponse { suggestions }))
}

/// POST /generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<ResumeSubmission>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    request.validate()?;

    let cover_letter =
        generate_cover_letter(&request.text, &request.job_description, &state.llm).await?;

    Ok(Json(CoverLetterResponse { cover_letter }))
}
