use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CLAUDE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TECHNICAL_MODEL: &str = "codellama:13b";
pub const DEFAULT_CONVERSATIONAL_MODEL: &str = "openchat:7b";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CLAUDE_KEY_PREFIX: &str = "sk-ant-";
const OPENAI_KEY_PREFIX: &str = "sk-";

/// Credentials and endpoints for the three responders.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub claude_base_url: String,
    pub claude_model: String,
    pub max_tokens: u32,
    pub ollama_base_url: String,
    pub technical_model: String,
    pub conversational_model: String,
    pub request_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            claude_api_key: None,
            openai_api_key: None,
            claude_base_url: DEFAULT_CLAUDE_URL.to_string(),
            claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            ollama_base_url: DEFAULT_OLLAMA_URL.to_string(),
            technical_model: DEFAULT_TECHNICAL_MODEL.to_string(),
            conversational_model: DEFAULT_CONVERSATIONAL_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.claude_api_key = env_non_empty("FORGE_CLAUDE_API_KEY");
        config.openai_api_key = env_non_empty("FORGE_OPENAI_API_KEY");
        if let Some(url) = env_non_empty("FORGE_CLAUDE_URL") {
            config.claude_base_url = url;
        }
        if let Some(model) = env_non_empty("FORGE_CLAUDE_MODEL") {
            config.claude_model = model;
        }
        if let Some(url) = env_non_empty("FORGE_OLLAMA_URL") {
            config.ollama_base_url = url;
        }
        config
    }

    /// Overlays values stored in the `settings` table. Empty values are ignored.
    pub fn apply_settings(&mut self, settings: &HashMap<String, String>) {
        let get = |key: &str| settings.get(key).filter(|v| !v.is_empty()).cloned();

        if let Some(v) = get("claude_api_key") {
            self.claude_api_key = Some(v);
        }
        if let Some(v) = get("openai_api_key") {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = get("claude_base_url") {
            self.claude_base_url = v;
        }
        if let Some(v) = get("claude_model") {
            self.claude_model = v;
        }
        if let Some(v) = get("ollama_base_url") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("technical_model") {
            self.technical_model = v;
        }
        if let Some(v) = get("conversational_model") {
            self.conversational_model = v;
        }
        if let Some(v) = get("max_tokens").and_then(|s| s.parse().ok()) {
            self.max_tokens = v;
        }
    }

    /// At least one credential slot holds a key with its provider's prefix.
    pub fn has_credentials(&self) -> bool {
        let claude = self
            .claude_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with(CLAUDE_KEY_PREFIX));
        let openai = self
            .openai_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with(OPENAI_KEY_PREFIX));
        claude || openai
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env_non_empty("FORGE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        Self {
            data_dir,
            ai: AiConfig::from_env(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("forge-ia")
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_provider_prefix() {
        let mut config = AiConfig::default();
        assert!(!config.has_credentials());

        config.claude_api_key = Some("your-key-here".into());
        assert!(!config.has_credentials());

        config.claude_api_key = Some("sk-ant-abc".into());
        assert!(config.has_credentials());

        config.claude_api_key = None;
        config.openai_api_key = Some("sk-proj-123".into());
        assert!(config.has_credentials());
    }

    #[test]
    fn settings_override_defaults() {
        let mut config = AiConfig::default();
        let mut settings = HashMap::new();
        settings.insert("ollama_base_url".to_string(), "http://gpu-box:11434".to_string());
        settings.insert("technical_model".to_string(), "deepseek-coder".to_string());
        settings.insert("max_tokens".to_string(), "not-a-number".to_string());
        settings.insert("claude_model".to_string(), String::new());

        config.apply_settings(&settings);

        assert_eq!(config.ollama_base_url, "http://gpu-box:11434");
        assert_eq!(config.technical_model, "deepseek-coder");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.claude_model, DEFAULT_CLAUDE_MODEL);
    }
}
