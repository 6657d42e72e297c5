//! Job analyzer — extracts responsibilities, skills, seniority and keywords
//! from a raw job description.

use crate::analysis::prompts::job_analysis_prompt;
use crate::analysis::run_use_case;
use crate::errors::AppError;
use crate::llm_client::{cache_key, LlmClient, ParsedReply, ReplyShape};

pub const CACHE_NAMESPACE: &str = "job_analysis";

/// The prompt asks for free-named categories, so any object is accepted.
pub const SHAPE: ReplyShape = ReplyShape::OBJECT;

pub async fn analyze_job(
    job_description: &str,
    llm: &LlmClient,
) -> Result<ParsedReply, AppError> {
    let prompt = job_analysis_prompt(job_description);
    let key = cache_key(CACHE_NAMESPACE, &[job_description]);
    run_use_case(llm, &prompt, &key, &SHAPE, "analyzing job description").await
}
