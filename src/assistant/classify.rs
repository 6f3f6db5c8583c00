//! Keyword heuristics that turn a free-text chat message into a task or a project spec.
//!
//! Every table is an ordered list of `(pattern, result)` pairs matched as lowercase
//! substrings; the first hit wins. Reproducible, not clever.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::orchestrator::{ProjectSpec, TaskKind};

pub const DEFAULT_PROJECT_NAME: &str = "Nouveau Projet";
pub const DEFAULT_PROJECT_TYPE: &str = "web";
pub const DEFAULT_FRAMEWORK: &str = "React + TypeScript";
pub const DEFAULT_LANGUAGE: &str = "typescript";

const TASK_KIND_TABLE: &[(&str, TaskKind)] = &[
    ("crée", TaskKind::Creative),
    ("génère", TaskKind::Creative),
    ("code", TaskKind::Technical),
    ("fonction", TaskKind::Technical),
];

const PROJECT_TYPE_TABLE: &[(&str, &str)] = &[
    ("site web", "web"),
    ("application web", "webapp"),
    ("app mobile", "mobile"),
    ("api", "api"),
    ("backend", "api"),
    ("jeu", "game"),
    ("portfolio", "portfolio"),
    ("blog", "cms"),
    ("e-commerce", "ecommerce"),
];

const FEATURE_KEYWORDS: &[&str] = &[
    "authentification",
    "login",
    "utilisateur",
    "auth",
    "base de données",
    "database",
    "db",
    "temps réel",
    "websocket",
    "live",
    "responsive",
    "mobile",
    "api",
    "rest",
    "graphql",
    "paiement",
    "stripe",
    "payment",
];

const FRAMEWORK_TABLE: &[(&str, &str)] = &[
    ("react", "React + TypeScript"),
    ("vue", "Vue 3"),
    ("svelte", "Svelte"),
    ("angular", "Angular"),
    ("next", "Next.js"),
    ("nuxt", "Nuxt"),
];

const LANGUAGES: &[&str] = &["typescript", "javascript", "python", "java", "css", "html"];

const PROJECT_INTENT_KEYWORDS: &[&str] = &["crée", "génère", "nouveau projet"];
const CODE_INTENT_KEYWORDS: &[&str] = &["code", "fonction", "composant"];

static PROJECT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:nommé|appelé|qui s'appelle)\s+["']?([^"']+)["']?"#)
        .expect("project name pattern is valid")
});

/// What the chat panel should do with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateProject(ProjectSpec),
    GenerateCode { language: String },
    Chat,
}

fn first_match<T: Copy>(text: &str, table: &[(&str, T)]) -> Option<T> {
    let lower = text.to_lowercase();
    table
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, result)| *result)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn classify_task_kind(message: &str) -> TaskKind {
    first_match(message, TASK_KIND_TABLE).unwrap_or(TaskKind::Conversational)
}

pub fn classify_intent(message: &str) -> Intent {
    if contains_any(message, PROJECT_INTENT_KEYWORDS) {
        Intent::CreateProject(extract_project_spec(message))
    } else if contains_any(message, CODE_INTENT_KEYWORDS) {
        Intent::GenerateCode {
            language: extract_language(message),
        }
    } else {
        Intent::Chat
    }
}

pub fn extract_project_spec(message: &str) -> ProjectSpec {
    ProjectSpec {
        name: extract_project_name(message).unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        project_type: extract_project_type(message),
        features: extract_features(message),
        framework: extract_framework(message),
    }
}

pub fn extract_project_name(message: &str) -> Option<String> {
    PROJECT_NAME_RE
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

pub fn extract_project_type(message: &str) -> String {
    first_match(message, PROJECT_TYPE_TABLE)
        .unwrap_or(DEFAULT_PROJECT_TYPE)
        .to_string()
}

pub fn extract_features(message: &str) -> Vec<String> {
    let lower = message.to_lowercase();
    FEATURE_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect()
}

pub fn extract_framework(message: &str) -> String {
    first_match(message, FRAMEWORK_TABLE)
        .unwrap_or(DEFAULT_FRAMEWORK)
        .to_string()
}

pub fn extract_language(message: &str) -> String {
    let lower = message.to_lowercase();
    LANGUAGES
        .iter()
        .find(|lang| lower.contains(*lang))
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_checks_creative_before_technical() {
        assert_eq!(classify_task_kind("Génère du code React"), TaskKind::Creative);
        assert_eq!(classify_task_kind("explique cette fonction"), TaskKind::Technical);
        assert_eq!(classify_task_kind("bonjour"), TaskKind::Conversational);
    }

    #[test]
    fn project_spec_from_message() {
        let spec = extract_project_spec(
            "Crée un site web e-commerce nommé \"MaBoutique\" avec Vue et paiement stripe",
        );
        assert_eq!(spec.name, "MaBoutique");
        assert_eq!(spec.project_type, "web");
        assert_eq!(spec.framework, "Vue 3");
        assert_eq!(spec.features, vec!["paiement", "stripe"]);
    }

    #[test]
    fn project_spec_defaults() {
        let spec = extract_project_spec("nouveau projet");
        assert_eq!(spec.name, DEFAULT_PROJECT_NAME);
        assert_eq!(spec.project_type, "web");
        assert_eq!(spec.framework, DEFAULT_FRAMEWORK);
        assert!(spec.features.is_empty());
    }

    #[test]
    fn table_order_decides_ties() {
        // "backend" and "api" both map to api, "api" is listed first either way
        assert_eq!(extract_project_type("un backend avec une API"), "api");
        // "javascript" contains "java" but typescript/javascript are checked first
        assert_eq!(extract_language("du JavaScript"), "javascript");
        assert_eq!(extract_language("en Java"), "java");
        assert_eq!(extract_language("rien"), "typescript");
    }

    #[test]
    fn intents_follow_panel_priority() {
        assert!(matches!(classify_intent("Crée une app"), Intent::CreateProject(_)));
        assert_eq!(
            classify_intent("un composant en python"),
            Intent::GenerateCode { language: "python".into() }
        );
        assert_eq!(classify_intent("Comment ça va ?"), Intent::Chat);
    }

    #[test]
    fn name_pattern_is_case_insensitive() {
        assert_eq!(extract_project_name("un blog Appelé 'Carnet'").as_deref(), Some("Carnet"));
        assert_eq!(extract_project_name("un blog"), None);
    }
}
