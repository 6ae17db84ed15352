//! Google Generative Language API (Gemini) provider.
//!
//! Auth is a plain API key sent in the `x-goog-api-key` header. Requests go to
//! `{base_url}/models/{model}:generateContent`; the first candidate's text
//! parts are concatenated into the response content.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Build the request body for the generateContent endpoint.
    fn build_body(req: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": req.prompt }]
            }]
        });
        if let Some(max) = req.max_tokens {
            body["generationConfig"] = serde_json::json!({ "maxOutputTokens": max });
        }
        body
    }

    /// Turn a decoded API response into a `ChatResponse`.
    ///
    /// A response without any candidate text (safety block, empty candidate
    /// list) is an error, not an empty reply.
    fn parse_response(api_resp: GeminiResponse, model: &str) -> Result<ChatResponse, ProviderError> {
        let usage = api_resp.usage_metadata.unwrap_or_default();
        let block_reason = api_resp.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = api_resp.candidates.into_iter().next() else {
            let reason = block_reason.unwrap_or_else(|| "no candidates".to_string());
            return Err(ProviderError::EmptyResponse(reason));
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let stop_reason = candidate.finish_reason.unwrap_or_default();

        if content.is_empty() {
            return Err(ProviderError::EmptyResponse(format!(
                "candidate has no text (finish reason: {})",
                if stop_reason.is_empty() { "unknown" } else { stop_reason.as_str() }
            )));
        }

        Ok(ChatResponse {
            content,
            model: model.to_string(),
            tokens_in: usage.prompt_token_count,
            tokens_out: usage.candidates_token_count,
            stop_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = self.endpoint(&req.model);
        let body = Self::build_body(req);

        debug!(model = %req.model, "sending request to Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Gemini API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let response = Self::parse_response(api_resp, &req.model)?;
        debug!(
            tokens_in = response.tokens_in,
            tokens_out = response.tokens_out,
            stop_reason = %response.stop_reason,
            "Gemini response received"
        );
        Ok(response)
    }
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
