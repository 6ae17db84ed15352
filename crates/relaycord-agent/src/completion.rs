use tracing::{debug, error};

use crate::provider::{ChatRequest, LlmProvider};

/// Reply used whenever the completion call fails, whatever the cause.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process that request.";

/// Single-shot completion front end over an [`LlmProvider`].
///
/// Every provider error (transport, status, parse, empty candidate) is
/// logged and collapsed into [`FALLBACK_REPLY`]. No retries.
pub struct CompletionClient {
    provider: Box<dyn LlmProvider>,
    model: String,
    max_tokens: Option<u32>,
}

impl CompletionClient {
    pub fn new(provider: Box<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Complete `prompt`. Never fails.
    pub async fn complete(&self, prompt: &str) -> String {
        let mut req = ChatRequest::single(&self.model, prompt);
        req.max_tokens = self.max_tokens;

        match self.provider.send(&req).await {
            Ok(resp) => {
                debug!(
                    provider = %self.provider.name(),
                    model = %resp.model,
                    tokens_in = resp.tokens_in,
                    tokens_out = resp.tokens_out,
                    "completion succeeded"
                );
                resp.content
            }
            Err(e) => {
                error!(provider = %self.provider.name(), error = %e, "completion failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
