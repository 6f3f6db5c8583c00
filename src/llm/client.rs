use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::config::AiConfig;
use crate::llm::types::*;
use crate::orchestrator::Responder;

const ANTHROPIC_VERSION: &str = "2023-06-01";

fn build_http(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Http(e.to_string()))
}

async fn error_for_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Creative responder: Claude messages API.
pub struct ClaudeClient {
    http: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl ClaudeClient {
    pub fn new(config: &AiConfig) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http(config.request_timeout)?,
            base_url: config.claude_base_url.clone(),
            model: config.claude_model.clone(),
            max_tokens: config.max_tokens,
            api_key: config.claude_api_key.clone().unwrap_or_default(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| LlmError::Http(e.to_string()))?;
        let key = HeaderValue::from_str(&self.api_key).map_err(|e| LlmError::Http(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let request = ClaudeMessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatTurn {
                role: "user".into(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let body: ClaudeMessagesResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.into_completion()
    }
}

#[async_trait]
impl Responder for ClaudeClient {
    fn name(&self) -> &str {
        "Claude"
    }

    async fn respond(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.complete(prompt).await
    }
}

/// Technical and conversational responders: a model served by a local Ollama.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &AiConfig, model: &str) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http(config.request_timeout)?,
            base_url: config.ollama_base_url.clone(),
            model: model.to_string(),
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<Completion, LlmError> {
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let body: OllamaGenerateResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(body.into_completion())
    }
}

#[async_trait]
impl Responder for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn respond(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.generate(prompt).await
    }
}
