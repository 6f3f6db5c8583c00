use serde::{Deserialize, Serialize};

use crate::llm::Completion;

/// Threshold at and above which any task goes to the creative responder.
pub const CREATIVE_COMPLEXITY: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Conversational,
    Creative,
    Technical,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Conversational => "conversational",
            TaskKind::Creative => "creative",
            TaskKind::Technical => "technical",
        }
    }
}

/// A single request for the router. Built once per user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTask {
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub complexity: u8,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AiTask {
    pub fn new(kind: TaskKind, complexity: u8, context: impl Into<String>) -> Self {
        Self {
            kind,
            complexity,
            context: context.into(),
            code: None,
            language: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Caller-side complexity heuristic: long messages count as complex.
pub fn score_complexity(context: &str) -> u8 {
    if context.chars().count() > 100 {
        CREATIVE_COMPLEXITY
    } else {
        5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOrigin {
    Live,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub success: bool,
    pub content: Option<String>,
    pub model: String,
    pub tokens_used: Option<u64>,
    pub error: Option<String>,
    pub origin: ResponseOrigin,
}

impl AiResponse {
    pub const DEMO_MODEL: &'static str = "Démo";

    pub fn live(responder: &str, completion: Completion) -> Self {
        Self {
            success: true,
            content: Some(completion.content),
            model: responder.to_string(),
            tokens_used: Some(completion.tokens_used),
            error: None,
            origin: ResponseOrigin::Live,
        }
    }

    pub fn demo(content: String, tokens_used: u64) -> Self {
        Self {
            success: true,
            content: Some(content),
            model: Self::DEMO_MODEL.to_string(),
            tokens_used: Some(tokens_used),
            error: None,
            origin: ResponseOrigin::Demo,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.origin == ResponseOrigin::Demo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_threshold_is_strictly_over_100_chars() {
        assert_eq!(score_complexity(&"a".repeat(100)), 5);
        assert_eq!(score_complexity(&"a".repeat(101)), 8);
        // counted in characters, not bytes
        assert_eq!(score_complexity(&"é".repeat(60)), 5);
    }

    #[test]
    fn task_serializes_kind_as_type() {
        let task = AiTask::new(TaskKind::Technical, 7, "fix").with_code("let x = 1;");
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["type"], "technical");
        assert_eq!(v["code"], "let x = 1;");
        assert!(v.get("language").is_none());
    }
}
