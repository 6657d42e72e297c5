//! LLM Client — the single point of entry for all generative-model calls.
//!
//! No other module talks to the Gemini API directly. Use-case services build a
//! prompt, hand it to `LlmClient` together with an optional cache key, and get
//! back either the raw reply text or a `ParsedReply`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod cache;
pub mod prompts;
pub mod response;

pub use cache::{cache_key, ResponseCache};
pub use response::{parse_model_reply_as, ParsedReply, ReplyShape};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    /// Built with `without_url` so the request URL never reaches callers.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Model returned no text content (finish reason: {0})")]
    EmptyContent(String),
}

/// A backend that turns a prompt into raw reply text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini REST backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Result<String, LlmError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| LlmError::EmptyContent("no candidates".to_string()))?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(LlmError::EmptyContent(reason.to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn transport_error(e: reqwest::Error) -> LlmError {
    LlmError::Http(e.without_url())
}

/// Maps a non-2xx reply to `LlmError::Api`, preferring the service's own
/// `error.message` and falling back to the raw body.
fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Calls `models/{model}:generateContent`. One attempt per call, no retries.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, api_base: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            api_base,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            return Err(api_error(status.as_u16(), body));
        }

        let body = response.text().await.map_err(transport_error)?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.text()
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cached client used by the services
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LlmClient {
    model: Arc<dyn TextModel>,
    cache: Option<Arc<ResponseCache>>,
}

impl LlmClient {
    pub fn new(model: Arc<dyn TextModel>, cache: Option<Arc<ResponseCache>>) -> Self {
        Self { model, cache }
    }

    pub fn from_config(config: &Config) -> Self {
        let gemini = GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_base.clone(),
        );
        let cache = config
            .cache_enabled
            .then(|| Arc::new(ResponseCache::from_ttl_secs(config.cache_ttl_secs)));
        Self::new(Arc::new(gemini), cache)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Returns the model's raw reply. A cached reply for `cache_key` is
    /// returned verbatim without calling the model; failures are never cached.
    pub async fn generate(
        &self,
        prompt: &str,
        cache_key: Option<&str>,
    ) -> Result<String, LlmError> {
        let cache = self.cache.as_deref().zip(cache_key);

        if let Some((cache, key)) = cache {
            if let Some(reply) = cache.get(key) {
                debug!(cache_key = key, "Model reply served from cache");
                return Ok(reply);
            }
        }

        debug!(model = self.model.name(), "Calling generative model");
        let reply = self.model.generate(prompt).await?;

        if let Some((cache, key)) = cache {
            cache.insert(key.to_string(), reply.clone());
        }

        Ok(reply)
    }

    /// `generate` followed by the reply parser. Only model failures are `Err`;
    /// an unparseable reply comes back as `ParsedReply::Fallback`.
    pub async fn generate_parsed(
        &self,
        prompt: &str,
        cache_key: Option<&str>,
        shape: &ReplyShape,
    ) -> Result<ParsedReply, LlmError> {
        let reply = self.generate(prompt, cache_key).await?;
        let parsed = parse_model_reply_as(&reply, shape);
        if parsed.is_fallback() {
            warn!(
                model = self.model.name(),
                "Model reply degraded to fallback"
            );
        }
        Ok(parsed)
    }

    /// Number of replies currently cached (expired entries included until looked up).
    pub fn cached_entries(&self) -> usize {
        self.cache
            .as_deref()
            .map(ResponseCache::entry_count)
            .unwrap_or(0)
    }

    /// Drops all cached replies. Returns the number removed.
    pub fn clear_cache(&self) -> usize {
        self.cache.as_deref().map(ResponseCache::clear).unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub enum MockReply {
        Text(String),
        Fail(String),
    }

    /// Scripted model: returns `replies` in order, repeating the last one.
    pub struct MockModel {
        replies: Vec<MockReply>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockModel {
        pub fn sequence(replies: Vec<MockReply>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::sequence(vec![MockReply::Text(text.to_string())])
        }

        pub fn failing(message: &str) -> Self {
            Self::sequence(vec![MockReply::Fail(message.to_string())])
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl TextModel for MockModel {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.replies.get(n).or(self.replies.last()) {
                Some(MockReply::Text(text)) => Ok(text.clone()),
                Some(MockReply::Fail(message)) => Err(LlmError::Api {
                    status: 503,
                    message: message.clone(),
                }),
                None => Err(LlmError::EmptyContent("no scripted reply".to_string())),
            }
        }

        fn name(&self) -> &str {
            "mock-model"
        }
    }

    pub fn client_with(model: Arc<MockModel>) -> LlmClient {
        LlmClient::new(model, Some(Arc::new(ResponseCache::new(None))))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{client_with, MockModel, MockReply};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reused_cache_key_skips_second_call() {
        let model = Arc::new(MockModel::sequence(vec![
            MockReply::Text("first".to_string()),
            MockReply::Text("second".to_string()),
        ]));
        let llm = client_with(model.clone());

        let a = llm.generate("prompt", Some("key")).await.unwrap();
        let b = llm.generate("prompt", Some("key")).await.unwrap();

        assert_eq!(a, "first");
        assert_eq!(b, "first");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_key_always_calls_model() {
        let model = Arc::new(MockModel::replying("reply"));
        let llm = client_with(model.clone());

        llm.generate("prompt", None).await.unwrap();
        llm.generate("prompt", None).await.unwrap();

        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_call() {
        let model = Arc::new(MockModel::sequence(vec![
            MockReply::Text("first".to_string()),
            MockReply::Text("second".to_string()),
        ]));
        let llm = client_with(model.clone());

        llm.generate("prompt", Some("key")).await.unwrap();
        assert_eq!(llm.clear_cache(), 1);
        let after = llm.generate("prompt", Some("key")).await.unwrap();

        assert_eq!(after, "second");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let model = Arc::new(MockModel::sequence(vec![
            MockReply::Fail("unavailable".to_string()),
            MockReply::Text("recovered".to_string()),
        ]));
        let llm = client_with(model.clone());

        let err = llm.generate("prompt", Some("key")).await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));

        let ok = llm.generate("prompt", Some("key")).await.unwrap();
        assert_eq!(ok, "recovered");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_ignores_keys() {
        let model = Arc::new(MockModel::replying("reply"));
        let llm = LlmClient::new(model.clone(), None);

        llm.generate("prompt", Some("key")).await.unwrap();
        llm.generate("prompt", Some("key")).await.unwrap();

        assert_eq!(model.calls(), 2);
        assert_eq!(llm.clear_cache(), 0);
    }

    #[tokio::test]
    async fn test_generate_parsed_returns_fallback_not_error() {
        let llm = client_with(Arc::new(MockModel::replying("Sorry, I cannot comply.")));
        let parsed = llm
            .generate_parsed("prompt", None, &ReplyShape::OBJECT)
            .await
            .unwrap();
        assert!(parsed.is_fallback());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_at_first_use() {
        let client = GeminiClient::new(
            None,
            "gemini-1.5-pro".to_string(),
            "http://unused".to_string(),
        );
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_api_error_prefers_service_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let err = api_error(400, body.to_string());
        assert!(matches!(
            err,
            LlmError::Api { status: 400, ref message } if message == "API key not valid."
        ));
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(502, "<html>Bad Gateway</html>".to_string());
        assert_eq!(
            err.to_string(),
            "API error (status 502): <html>Bad Gateway</html>"
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let client = GeminiClient::new(
            Some("SECRET-KEY-123".to_string()),
            "gemini-1.5-pro".to_string(),
            "http://127.0.0.1:1/v1beta".to_string(),
        );
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        let message = err.to_string();
        assert!(!message.contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn test_cached_entries_counts_stored_replies() {
        let llm = client_with(Arc::new(MockModel::replying("reply")));
        assert_eq!(llm.cached_entries(), 0);
        llm.generate("prompt", Some("a")).await.unwrap();
        llm.generate("prompt", Some("b")).await.unwrap();
        assert_eq!(llm.cached_entries(), 2);
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(
            Some("k".to_string()),
            "gemini-1.5-pro".to_string(),
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
        );
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().unwrap(), "{\"a\": 1}");
        assert_eq!(parsed.usage_metadata.unwrap().prompt_token_count, Some(12));
    }

    #[test]
    fn test_blocked_response_is_empty_content() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let err = parsed.text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_no_candidates_is_empty_content() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = parsed.text().unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent(ref r) if r == "no candidates"));
    }
}
