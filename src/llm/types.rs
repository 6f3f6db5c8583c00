use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaudeMessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessagesResponse {
    pub content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    pub usage: Option<ClaudeUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeContentBlock {
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClaudeUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaGenerateResponse {
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Text produced by a responder and its token usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub tokens_used: u64,
}

impl ClaudeMessagesResponse {
    pub fn into_completion(self) -> Result<Completion, LlmError> {
        let tokens_used = self
            .usage
            .map(|u| u.input_tokens + u.output_tokens)
            .unwrap_or(0);
        let content = self
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| LlmError::InvalidResponse("No text block in response".to_string()))?;
        Ok(Completion { content, tokens_used })
    }
}

impl OllamaGenerateResponse {
    pub fn into_completion(self) -> Completion {
        let tokens_used = match (self.prompt_eval_count, self.eval_count) {
            (Some(p), Some(e)) => p + e,
            _ => 0,
        };
        Completion {
            content: self.response,
            tokens_used,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing API key. Set FORGE_CLAUDE_API_KEY environment variable.")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claude_response_sums_usage() {
        let body = json!({
            "id": "msg_1",
            "content": [{ "type": "text", "text": "Bonjour" }],
            "usage": { "input_tokens": 12, "output_tokens": 30 }
        });
        let resp: ClaudeMessagesResponse = serde_json::from_value(body).unwrap();
        let completion = resp.into_completion().unwrap();
        assert_eq!(completion.content, "Bonjour");
        assert_eq!(completion.tokens_used, 42);
    }

    #[test]
    fn claude_response_without_text_is_invalid() {
        let resp: ClaudeMessagesResponse =
            serde_json::from_value(json!({ "content": [] })).unwrap();
        assert!(matches!(resp.into_completion(), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn ollama_missing_counts_yield_zero_tokens() {
        let resp: OllamaGenerateResponse =
            serde_json::from_value(json!({ "response": "ok", "eval_count": 9 })).unwrap();
        assert_eq!(resp.into_completion().tokens_used, 0);

        let resp: OllamaGenerateResponse = serde_json::from_value(
            json!({ "response": "ok", "prompt_eval_count": 4, "eval_count": 9 }),
        )
        .unwrap();
        assert_eq!(resp.into_completion().tokens_used, 13);
    }

    #[test]
    fn request_bodies_match_wire_shape() {
        let claude = ClaudeMessagesRequest {
            model: "claude-3-sonnet-20240229".into(),
            max_tokens: 4000,
            messages: vec![ChatTurn { role: "user".into(), content: "hi".into() }],
        };
        assert_eq!(
            serde_json::to_value(&claude).unwrap(),
            json!({
                "model": "claude-3-sonnet-20240229",
                "max_tokens": 4000,
                "messages": [{ "role": "user", "content": "hi" }]
            })
        );

        let ollama = OllamaGenerateRequest {
            model: "openchat:7b".into(),
            prompt: "hi".into(),
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&ollama).unwrap(),
            json!({ "model": "openchat:7b", "prompt": "hi", "stream": false })
        );
    }
}
