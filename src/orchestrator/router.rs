use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AiConfig;
use crate::llm::{ClaudeClient, Completion, LlmError, OllamaClient};
use crate::logging;
use crate::orchestrator::demo::demo_response;
use crate::orchestrator::prompts::{self, ProjectSpec};
use crate::orchestrator::task::{AiResponse, AiTask, TaskKind, CREATIVE_COMPLEXITY};

/// A downstream model endpoint. One blocking request per call, no retry.
#[async_trait]
pub trait Responder: Send + Sync {
    fn name(&self) -> &str;

    async fn respond(&self, prompt: &str) -> Result<Completion, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Creative,
    Technical,
    Conversational,
}

/// First match wins: creative kind or high complexity, then technical kind or
/// attached code, then conversation.
pub fn select_route(task: &AiTask) -> Route {
    if task.kind == TaskKind::Creative || task.complexity >= CREATIVE_COMPLEXITY {
        Route::Creative
    } else if task.kind == TaskKind::Technical || task.code.is_some() {
        Route::Technical
    } else {
        Route::Conversational
    }
}

pub fn format_prompt(route: Route, task: &AiTask) -> String {
    match route {
        Route::Creative => prompts::creative_prompt(task),
        Route::Technical => prompts::technical_prompt(task),
        Route::Conversational => task.context.clone(),
    }
}

#[derive(Clone)]
pub struct Responders {
    pub creative: Arc<dyn Responder>,
    pub technical: Arc<dyn Responder>,
    pub conversational: Arc<dyn Responder>,
}

impl Responders {
    fn for_route(&self, route: Route) -> &Arc<dyn Responder> {
        match route {
            Route::Creative => &self.creative,
            Route::Technical => &self.technical,
            Route::Conversational => &self.conversational,
        }
    }
}

/// Picks a responder per task. Without responders the router answers every task
/// with the canned demo text for the task's kind.
pub struct TaskRouter {
    responders: Option<Responders>,
}

impl TaskRouter {
    /// Credentials are checked once here; a router built without them stays in
    /// demo mode for its whole lifetime.
    pub fn from_config(config: &AiConfig) -> Self {
        if !config.has_credentials() {
            tracing::warn!("AI credentials not configured, running in demo mode");
            return Self::demo();
        }

        match build_responders(config) {
            Ok(responders) => {
                tracing::info!(
                    creative = responders.creative.name(),
                    technical = responders.technical.name(),
                    conversational = responders.conversational.name(),
                    "AI responders configured"
                );
                Self::with_responders(responders)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build AI clients, running in demo mode");
                Self::demo()
            }
        }
    }

    pub fn with_responders(responders: Responders) -> Self {
        Self {
            responders: Some(responders),
        }
    }

    pub fn demo() -> Self {
        Self { responders: None }
    }

    pub fn is_configured(&self) -> bool {
        self.responders.is_some()
    }

    pub async fn process_task(&self, task: AiTask) -> AiResponse {
        tracing::debug!(
            task_kind = task.kind.as_str(),
            complexity = task.complexity,
            "Processing task"
        );

        let Some(responders) = &self.responders else {
            return demo_response(&task);
        };

        let route = select_route(&task);
        let responder = responders.for_route(route);
        logging::log_route(task.kind.as_str(), task.complexity, responder.name());

        let prompt = format_prompt(route, &task);
        match responder.respond(&prompt).await {
            Ok(completion) => AiResponse::live(responder.name(), completion),
            Err(e) => {
                logging::log_responder_failure(responder.name(), &e);
                demo_response(&task)
            }
        }
    }

    pub async fn create_project(&self, spec: &ProjectSpec) -> AiResponse {
        self.process_task(project_task(spec)).await
    }

    pub async fn analyze_and_improve(&self, code: &str, language: &str) -> AiResponse {
        self.process_task(analysis_task(code, language)).await
    }
}

pub fn project_task(spec: &ProjectSpec) -> AiTask {
    AiTask::new(TaskKind::Creative, 10, prompts::project_creation_prompt(spec))
}

pub fn analysis_task(code: &str, language: &str) -> AiTask {
    AiTask::new(TaskKind::Technical, 7, prompts::ANALYZE_CONTEXT)
        .with_code(code)
        .with_language(language)
}

fn build_responders(config: &AiConfig) -> Result<Responders, LlmError> {
    Ok(Responders {
        creative: Arc::new(ClaudeClient::new(config)?),
        technical: Arc::new(OllamaClient::new(config, &config.technical_model)?),
        conversational: Arc::new(OllamaClient::new(config, &config.conversational_model)?),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed completion, or fails on demand.
    pub struct FakeResponder {
        pub label: String,
        pub tokens: u64,
        pub fail: bool,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeResponder {
        pub fn ok(label: &str, tokens: u64) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                tokens,
                fail: false,
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(label: &str) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                tokens: 0,
                fail: true,
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Responder for FakeResponder {
        fn name(&self) -> &str {
            &self.label
        }

        async fn respond(&self, prompt: &str) -> Result<Completion, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(LlmError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(Completion {
                content: format!("{} says: {}", self.label, prompt),
                tokens_used: self.tokens,
            })
        }
    }

    pub struct Fakes {
        pub creative: Arc<FakeResponder>,
        pub technical: Arc<FakeResponder>,
        pub conversational: Arc<FakeResponder>,
    }

    impl Fakes {
        pub fn new() -> Self {
            Self {
                creative: FakeResponder::ok("Claude", 100),
                technical: FakeResponder::ok("codellama:13b", 40),
                conversational: FakeResponder::ok("openchat:7b", 10),
            }
        }

        pub fn router(&self) -> TaskRouter {
            TaskRouter::with_responders(Responders {
                creative: self.creative.clone(),
                technical: self.technical.clone(),
                conversational: self.conversational.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn creative_kind_wins_regardless_of_complexity() {
        let task = AiTask::new(TaskKind::Creative, 0, "x");
        assert_eq!(select_route(&task), Route::Creative);
    }

    #[test]
    fn high_complexity_overrides_kind() {
        let task = AiTask::new(TaskKind::Conversational, 9, "x");
        assert_eq!(select_route(&task), Route::Creative);
        let task = AiTask::new(TaskKind::Technical, 8, "x").with_code("fn main() {}");
        assert_eq!(select_route(&task), Route::Creative);
    }

    #[test]
    fn attached_code_routes_to_technical() {
        let task = AiTask::new(TaskKind::Conversational, 5, "x").with_code("let a = 1;");
        assert_eq!(select_route(&task), Route::Technical);
        let task = AiTask::new(TaskKind::Technical, 5, "x");
        assert_eq!(select_route(&task), Route::Technical);
        let task = AiTask::new(TaskKind::Conversational, 7, "x");
        assert_eq!(select_route(&task), Route::Conversational);
    }

    #[test]
    fn conversational_prompt_is_passed_through() {
        let task = AiTask::new(TaskKind::Conversational, 5, "salut");
        assert_eq!(format_prompt(Route::Conversational, &task), "salut");
    }

    #[test]
    fn router_without_credentials_is_demo() {
        let router = TaskRouter::from_config(&AiConfig::default());
        assert!(!router.is_configured());
    }

    #[test]
    fn router_with_claude_key_is_configured() {
        let config = AiConfig {
            claude_api_key: Some("sk-ant-test".into()),
            ..AiConfig::default()
        };
        assert!(TaskRouter::from_config(&config).is_configured());
    }

    #[tokio::test]
    async fn demo_mode_always_succeeds_with_context() {
        let router = TaskRouter::demo();
        for kind in [TaskKind::Creative, TaskKind::Technical, TaskKind::Conversational] {
            let resp = router.process_task(AiTask::new(kind, 3, "mon contexte")).await;
            assert!(resp.success);
            assert_eq!(resp.model, "Démo");
            assert!(resp.content.unwrap().contains("mon contexte"));
        }
    }

    #[tokio::test]
    async fn live_call_uses_selected_responder() {
        let fakes = Fakes::new();
        let router = fakes.router();

        let resp = router
            .process_task(AiTask::new(TaskKind::Conversational, 5, "bonjour"))
            .await;

        assert!(!resp.is_demo());
        assert_eq!(resp.model, "openchat:7b");
        assert_eq!(resp.tokens_used, Some(10));
        assert_eq!(fakes.conversational.last_prompt().as_deref(), Some("bonjour"));
        assert_eq!(fakes.creative.calls(), 0);
        assert_eq!(fakes.technical.calls(), 0);
    }

    #[tokio::test]
    async fn responder_failure_degrades_to_demo() {
        let fakes = Fakes {
            creative: FakeResponder::failing("Claude"),
            ..Fakes::new()
        };
        let router = fakes.router();

        let resp = router
            .process_task(AiTask::new(TaskKind::Creative, 2, "une landing page"))
            .await;

        assert!(resp.success);
        assert!(resp.is_demo());
        assert!(resp.content.unwrap().contains("une landing page"));
        assert_eq!(fakes.creative.calls(), 1);
    }

    #[tokio::test]
    async fn create_project_goes_to_creative_with_generation_prompt() {
        let fakes = Fakes::new();
        let router = fakes.router();
        let spec = ProjectSpec {
            name: "Blog".into(),
            project_type: "cms".into(),
            features: vec![],
            framework: "Svelte".into(),
        };

        let resp = router.create_project(&spec).await;

        assert_eq!(resp.model, "Claude");
        let prompt = fakes.creative.last_prompt().unwrap();
        assert!(prompt.contains("Crée un projet cms complet nommé \"Blog\" avec Svelte."));
    }

    #[tokio::test]
    async fn analyze_goes_to_technical_with_code() {
        let fakes = Fakes::new();
        let router = fakes.router();

        let resp = router.analyze_and_improve("var a = 1", "javascript").await;

        assert_eq!(resp.model, "codellama:13b");
        let prompt = fakes.technical.last_prompt().unwrap();
        assert!(prompt.contains("Analyze and improve this javascript code"));
        assert!(prompt.contains("var a = 1"));
    }
}
