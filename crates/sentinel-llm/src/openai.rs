use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;
use crate::retry::with_transport_retry;
use crate::types::{ChatRequest, ChatResponse, ToolCall};

/// Provider for the OpenAI chat-completions wire format, also spoken by most
/// OpenAI-compatible self-hosted gateways (hence `with_path` accepting a
/// custom base URL and completions path).
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
    chat_path: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>, default_model: String) -> Self {
        Self::with_path(
            "openai",
            api_key,
            base_url.unwrap_or_else(|| "https://api.openai.com".to_string()),
            "/v1/chat/completions".to_string(),
            default_model,
        )
    }

    pub fn with_path(
        name: impl Into<String>,
        api_key: String,
        base_url: String,
        chat_path: String,
        default_model: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider_name: name.into(),
            api_key,
            base_url,
            chat_path,
            default_model,
        }
    }

    async fn send_once(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let model = if req.model.is_empty() { &self.default_model } else { &req.model };
        let body = build_request_body(req, model);
        let url = format!("{}{}", self.base_url, self.chat_path);

        debug!(model = %model, provider = %self.provider_name, "sending request to LLM provider");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry_after_ms = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(5000);
            return Err(LlmError::RateLimited { retry_after_ms });
        }

        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let api_resp: ApiResponse = resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;
        parse_response(api_resp)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn generate(&self, req: &ChatRequest) -> Result<ChatResponse> {
        with_transport_retry(&self.provider_name, || self.send_once(req)).await
    }
}

fn build_request_body(req: &ChatRequest, model: &str) -> serde_json::Value {
    let mut messages = vec![serde_json::json!({
        "role": "system",
        "content": req.system,
    })];
    for m in &req.messages {
        let role = match m.role {
            crate::types::ChatRole::User => "user",
            crate::types::ChatRole::Model => "assistant",
        };
        messages.push(serde_json::json!({
            "role": role,
            "content": m.text,
        }));
    }

    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
        "max_tokens": req.config.max_tokens,
        "temperature": req.config.temperature,
    });

    if !req.tools.is_empty() {
        let tools: Vec<serde_json::Value> = req
            .tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = serde_json::json!(tools);
    }

    body
}

fn parse_response(resp: ApiResponse) -> Result<ChatResponse> {
    let choice = resp.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;

    let tool_call = choice
        .message
        .tool_calls
        .and_then(|calls| calls.into_iter().next())
        .map(|tc| -> Result<ToolCall> {
            let args: serde_json::Value =
                serde_json::from_str(&tc.function.arguments).map_err(|e| LlmError::Parse(e.to_string()))?;
            let args = args.as_object().cloned().unwrap_or_default();
            Ok(ToolCall { name: tc.function.name, args })
        })
        .transpose()?;

    let text = choice.message.content.filter(|c| !c.is_empty());
    let finish_reason = choice.finish_reason.unwrap_or_default();

    if text.is_none() && tool_call.is_none() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(ChatResponse { finish_reason, text, tool_call })
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageDto,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessageDto {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize)]
struct ApiToolCall {
    function: ApiFunction,
}

#[derive(Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatMessage, ChatRole, GenerationConfig};

    #[test]
    fn build_request_body_includes_system_and_tools() {
        let req = ChatRequest {
            model: String::new(),
            system: "be helpful".into(),
            messages: vec![ChatMessage { role: ChatRole::User, text: "hi".into() }],
            tools: vec![crate::types::ToolDefinition {
                name: "get_services".into(),
                description: "list services".into(),
                parameters: serde_json::json!({"type": "object"}),
            }],
            config: GenerationConfig::clamped(0.7, 256),
        };
        let body = build_request_body(&req, "gpt-test");
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["tools"][0]["function"]["name"], "get_services");
    }

    #[test]
    fn parse_response_rejects_empty_choice() {
        let resp = ApiResponse { choices: vec![] };
        assert!(matches!(parse_response(resp), Err(LlmError::EmptyResponse)));
    }
}
