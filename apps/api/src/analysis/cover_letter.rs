//! Cover letter generation.
//!
//! Unlike the other use cases, the prompt names its top-level key, so a reply
//! without `cover_letter` is downgraded to a fallback.

use crate::analysis::prompts::cover_letter_prompt;
use crate::analysis::run_use_case;
use crate::errors::AppError;
use crate::llm_client::{cache_key, LlmClient, ParsedReply, ReplyShape};

pub const CACHE_NAMESPACE: &str = "cover_letter";
pub const SHAPE: ReplyShape = ReplyShape::requiring(&["cover_letter"]);

pub async fn generate_cover_letter(
    resume_text: &str,
    job_description: &str,
    llm: &LlmClient,
) -> Result<ParsedReply, AppError> {
    let prompt = cover_letter_prompt(resume_text, job_description);
    let key = cache_key(CACHE_NAMESPACE, &[resume_text, job_description]);
    run_use_case(llm, &prompt, &key, &SHAPE, "generating cover letter").await
}
