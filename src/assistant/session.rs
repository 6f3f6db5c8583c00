use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::assistant::classify::{self, Intent};
use crate::models::{new_id, now_iso, ChatMessage, ChatRole, MessageMetadata};
use crate::orchestrator::{
    analysis_task, project_task, score_complexity, AiResponse, AiTask, ProjectSpec, TaskKind, TaskRouter,
};

pub const FALLBACK_REPLY: &str = "Désolé, je n'ai pas pu traiter votre demande.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiModel {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub max_tokens: u32,
}

pub const AVAILABLE_MODELS: &[AiModel] = &[
    AiModel { id: "auto", name: "Routage Intelligent", kind: TaskKind::Conversational, max_tokens: 4000 },
    AiModel { id: "claude", name: "Claude (Créatif)", kind: TaskKind::Creative, max_tokens: 8000 },
    AiModel { id: "codellama", name: "CodeLlama (Technique)", kind: TaskKind::Technical, max_tokens: 4000 },
    AiModel { id: "openchat", name: "OpenChat (Conversationnel)", kind: TaskKind::Conversational, max_tokens: 2000 },
];

/// One chat-panel action, before it reaches the router.
#[derive(Debug, Clone)]
pub enum ChatRequest {
    Message(String),
    UserInput(String),
    GenerateCode { prompt: String, language: String },
    CreateProject(ProjectSpec),
    AnalyzeCode { code: String, language: String },
}

/// A task that left the session and is waiting for the router. Assistant turns are
/// recorded only for requests that also recorded a user turn.
#[derive(Debug)]
pub struct PendingTurn {
    task: AiTask,
    started: Instant,
    complexity: Option<u8>,
    record: bool,
}

impl PendingTurn {
    pub fn task(&self) -> &AiTask {
        &self.task
    }
}

/// Chat façade used by the panels. Every operation builds an `AiTask` and goes
/// through the shared router; token usage accumulates for the whole session.
pub struct AssistantSession {
    router: Arc<TaskRouter>,
    active_model: &'static AiModel,
    history: Vec<ChatMessage>,
    tokens_used: u64,
}

impl AssistantSession {
    pub fn new(router: Arc<TaskRouter>) -> Self {
        Self {
            router,
            active_model: &AVAILABLE_MODELS[0],
            history: Vec::new(),
            tokens_used: 0,
        }
    }

    pub fn router(&self) -> &Arc<TaskRouter> {
        &self.router
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used
    }

    pub fn active_model(&self) -> &AiModel {
        self.active_model
    }

    pub fn models(&self) -> &'static [AiModel] {
        AVAILABLE_MODELS
    }

    /// Unknown ids leave the selection unchanged.
    pub fn select_model(&mut self, model_id: &str) -> bool {
        match AVAILABLE_MODELS.iter().find(|m| m.id == model_id) {
            Some(model) => {
                self.active_model = model;
                tracing::info!(model = model.name, "Active model changed");
                true
            }
            None => false,
        }
    }

    /// Empties the history. The token total is kept.
    pub fn clear_chat(&mut self) {
        self.history.clear();
        tracing::info!("Chat history cleared");
    }

    pub async fn send_message(&mut self, message: &str) -> AiResponse {
        self.run(ChatRequest::Message(message.to_string())).await
    }

    pub async fn generate_code(&mut self, prompt: &str, language: &str) -> AiResponse {
        self.run(ChatRequest::GenerateCode {
            prompt: prompt.to_string(),
            language: language.to_string(),
        })
        .await
    }

    pub async fn create_project(&mut self, spec: &ProjectSpec) -> AiResponse {
        self.run(ChatRequest::CreateProject(spec.clone())).await
    }

    pub async fn analyze_code(&mut self, code: &str, language: &str) -> AiResponse {
        self.run(ChatRequest::AnalyzeCode {
            code: code.to_string(),
            language: language.to_string(),
        })
        .await
    }

    /// Chat panel entry point: picks project creation, code generation or plain
    /// conversation from the message keywords.
    pub async fn handle_user_input(&mut self, message: &str) -> AiResponse {
        self.run(ChatRequest::UserInput(message.to_string())).await
    }

    async fn run(&mut self, request: ChatRequest) -> AiResponse {
        let pending = self.prepare(request);
        let response = self.router.process_task(pending.task.clone()).await;
        self.complete(pending, &response);
        response
    }

    /// Runs a request against a session shared between callers. The lock is held only
    /// to record turns, never across the router call, so overlapping requests proceed
    /// independently and their replies land in arrival order.
    pub async fn dispatch(session: &tokio::sync::Mutex<Self>, request: ChatRequest) -> AiResponse {
        let (router, pending) = {
            let mut guard = session.lock().await;
            let pending = guard.prepare(request);
            (guard.router.clone(), pending)
        };
        let response = router.process_task(pending.task.clone()).await;
        session.lock().await.complete(pending, &response);
        response
    }

    /// Records the user turn where the request has one and builds the routed task.
    pub fn prepare(&mut self, request: ChatRequest) -> PendingTurn {
        let started = Instant::now();
        let (task, complexity, record) = match request {
            ChatRequest::Message(message) => {
                let (task, complexity) = self.chat_task(&message);
                (task, Some(complexity), true)
            }
            ChatRequest::UserInput(message) => match classify::classify_intent(&message) {
                Intent::Chat => {
                    let (task, complexity) = self.chat_task(&message);
                    (task, Some(complexity), true)
                }
                Intent::CreateProject(spec) => {
                    self.push_user(&message);
                    (project_task(&spec), None, true)
                }
                Intent::GenerateCode { language } => {
                    self.push_user(&message);
                    (code_task(&message, &language), None, true)
                }
            },
            ChatRequest::GenerateCode { prompt, language } => (code_task(&prompt, &language), None, false),
            ChatRequest::CreateProject(spec) => (project_task(&spec), None, false),
            ChatRequest::AnalyzeCode { code, language } => (analysis_task(&code, &language), None, false),
        };
        PendingTurn {
            task,
            started,
            complexity,
            record,
        }
    }

    /// Records the assistant turn (when the request recorded a user turn) and adds the
    /// reply's tokens to the session total.
    pub fn complete(&mut self, pending: PendingTurn, response: &AiResponse) {
        if pending.record {
            self.push_assistant(response, pending.started, pending.complexity);
        }
        if let Some(tokens) = response.tokens_used {
            self.tokens_used += tokens;
        }
    }

    fn chat_task(&mut self, message: &str) -> (AiTask, u8) {
        self.push_user(message);
        let complexity = score_complexity(message);
        (AiTask::new(classify::classify_task_kind(message), complexity, message), complexity)
    }

    fn push_user(&mut self, content: &str) {
        self.history.push(ChatMessage {
            id: new_id(),
            content: content.to_string(),
            role: ChatRole::User,
            timestamp: now_iso(),
            model: Some(self.active_model.name.to_string()),
            metadata: None,
        });
    }

    fn push_assistant(&mut self, response: &AiResponse, started: Instant, complexity: Option<u8>) {
        let content = response
            .content
            .clone()
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());
        self.history.push(ChatMessage {
            id: new_id(),
            content,
            role: ChatRole::Assistant,
            timestamp: now_iso(),
            model: Some(response.model.clone()),
            metadata: Some(MessageMetadata {
                tokens_used: Some(response.tokens_used.unwrap_or(0)),
                processing_time_ms: Some(started.elapsed().as_millis() as u64),
                complexity,
            }),
        });
    }
}

fn code_task(prompt: &str, language: &str) -> AiTask {
    AiTask::new(
        TaskKind::Technical,
        8,
        format!("Génère du code {language} pour: {prompt}"),
    )
    .with_language(language)
}
