use crate::analysis::prompts::optimization_prompt;
use crate::analysis::run_use_case;
use crate::errors::AppError;
use crate::llm_client::{cache_key, LlmClient, ParsedReply, ReplyShape};

pub const CACHE_NAMESPACE: &str = "optimization";
pub const SHAPE: ReplyShape = ReplyShape::OBJECT;

/// Suggests resume changes that improve fit for the given job description.
pub async fn optimize_resume(
    resume_text: &str,
    job_description: &str,
    llm: &LlmClient,
) -> Result<ParsedReply, AppError> {
    let prompt = optimization_prompt(resume_text, job_description);
    let key = cache_key(CACHE_NAMESPACE, &[resume_text, job_description]);
    run_use_case(
        llm,
        &prompt,
        &key,
        &SHAPE,
        "generating optimization suggestions",
    )
    .await
}
