use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse, GenerationConfig};

/// Common interface for all LLM providers. Implementations MUST NOT retry
/// silently on content errors (malformed output, empty response); only
/// transient transport failures may be retried, and only up to a small
/// bounded count with exponential backoff.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// Issues a minimal generate call and checks for a text reply.
    async fn health_check(&self) -> Result<bool> {
        use crate::types::{ChatMessage, ChatRole};

        let req = ChatRequest {
            model: String::new(),
            system: "Reply with the single word: ok".to_string(),
            messages: vec![ChatMessage {
                role: ChatRole::User,
                text: "ping".to_string(),
            }],
            tools: Vec::new(),
            config: GenerationConfig::clamped(0.0, 16),
        };
        match self.generate(&req).await {
            Ok(resp) => Ok(resp.text.is_some()),
            Err(LlmError::EmptyResponse) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
