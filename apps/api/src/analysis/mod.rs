// Job application analysis: job description analysis, resume matching,
// optimization suggestions and cover letters.
// Every use case is prompt -> LlmClient (cached) -> reply parser.

pub mod cover_letter;
pub mod handlers;
pub mod job_analyzer;
pub mod optimizer;
pub mod prompts;
pub mod resume_matcher;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, ParsedReply, ReplyShape};

/// Shared pipeline for the four use cases.
///
/// `action` names the use case in the error detail, e.g. "analyzing job description".
async fn run_use_case(
    llm: &LlmClient,
    prompt: &str,
    cache_key: &str,
    shape: &ReplyShape,
    action: &str,
) -> Result<ParsedReply, AppError> {
    llm.generate_parsed(prompt, Some(cache_key), shape)
        .await
        .map_err(|e| AppError::Llm(format!("Error {action}: {e}")))
}
