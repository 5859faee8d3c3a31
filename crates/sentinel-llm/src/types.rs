use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// A single tool exposed to the model as a JSON-schema function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationConfig {
    /// Clamps to provider-valid ranges: temperature in [0, 2], max_tokens in [1, 8192].
    pub fn clamped(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: temperature.clamp(0.0, 2.0),
            max_tokens: max_tokens.clamp(1, 8192),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub config: GenerationConfig,
}

/// Exactly one of `text` or `tool_call` is populated on a successful response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub finish_reason: String,
    pub text: Option<String>,
    pub tool_call: Option<ToolCall>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_clamps_out_of_range_values() {
        let cfg = GenerationConfig::clamped(5.0, 0);
        assert_eq!(cfg.temperature, 2.0);
        assert_eq!(cfg.max_tokens, 1);
    }
}
