//! Resume matcher — scores a resume against a job description.

use crate::analysis::prompts::resume_match_prompt;
use crate::analysis::run_use_case;
use crate::errors::AppError;
use crate::llm_client::{cache_key, LlmClient, ParsedReply, ReplyShape};

pub const CACHE_NAMESPACE: &str = "resume_match";
pub const SHAPE: ReplyShape = ReplyShape::OBJECT;

pub async fn match_resume(
    resume_text: &str,
    job_description: &str,
    llm: &LlmClient,
) -> Result<ParsedReply, AppError> {
    let prompt = resume_match_prompt(resume_text, job_description);
    let key = cache_key(CACHE_NAMESPACE, &[resume_text, job_description]);
    run_use_case(llm, &prompt, &key, &SHAPE, "matching resume").await
}
