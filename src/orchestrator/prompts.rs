use serde::{Deserialize, Serialize};

use crate::orchestrator::task::AiTask;

const DEFAULT_CODE_LANGUAGE: &str = "JavaScript";

/// What the user asked for when creating a project through the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub features: Vec<String>,
    pub framework: String,
}

pub fn creative_prompt(task: &AiTask) -> String {
    format!(
        "En tant qu'architecte créatif de FORGE-IA, {context}\n\
         \n\
         Si la demande concerne la création d'un projet complet, fournis:\n\
         1. Architecture recommandée\n\
         2. Technologies à utiliser\n\
         3. Structure des fichiers\n\
         4. Code des composants principaux\n\
         5. Configuration de déploiement\n\
         \n\
         Sois concret et génère du code prêt à l'emploi.",
        context = task.context
    )
}

pub fn technical_prompt(task: &AiTask) -> String {
    let mut prompt = String::from("# FORGE-IA Code Generation\n\n");

    if let Some(code) = &task.code {
        let language = task.language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE);
        prompt.push_str(&format!(
            "Analyze and improve this {language} code:\n```\n{code}\n```\n\n"
        ));
    }

    prompt.push_str(&format!("Task: {}\n\n", task.context));
    prompt.push_str("Generate clean, production-ready code with:\n");
    prompt.push_str("- TypeScript types\n");
    prompt.push_str("- Error handling\n");
    prompt.push_str("- Documentation\n");
    prompt.push_str("- Best practices\n\nCode:");

    prompt
}

pub fn project_creation_prompt(spec: &ProjectSpec) -> String {
    format!(
        "Crée un projet {kind} complet nommé \"{name}\" avec {framework}.\n\
         \n\
         Fonctionnalités requises: {features}\n\
         \n\
         Génère:\n\
         1. Structure complète des fichiers\n\
         2. Package.json avec toutes les dépendances\n\
         3. Code source principal\n\
         4. Configuration (Vite, TypeScript, etc.)\n\
         5. README avec instructions d'installation\n\
         \n\
         Format de réponse: Code prêt à copier-coller avec structure de dossiers claire.",
        kind = spec.project_type,
        name = spec.name,
        framework = spec.framework,
        features = spec.features.join(", "),
    )
}

pub const ANALYZE_CONTEXT: &str = "Analyse ce code et améliore-le avec les meilleures pratiques";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::task::TaskKind;

    #[test]
    fn technical_prompt_embeds_code_with_default_language() {
        let task = AiTask::new(TaskKind::Technical, 7, "rends-le plus sûr").with_code("eval(x)");
        let prompt = technical_prompt(&task);
        assert!(prompt.contains("Analyze and improve this JavaScript code:\n```\neval(x)\n```"));
        assert!(prompt.contains("Task: rends-le plus sûr"));
        assert!(prompt.ends_with("Code:"));
    }

    #[test]
    fn technical_prompt_without_code_skips_block() {
        let task = AiTask::new(TaskKind::Technical, 5, "écris un hook").with_language("typescript");
        assert!(!technical_prompt(&task).contains("```"));
    }

    #[test]
    fn creative_prompt_wraps_context() {
        let task = AiTask::new(TaskKind::Creative, 9, "imagine un portfolio");
        let prompt = creative_prompt(&task);
        assert!(prompt.starts_with("En tant qu'architecte créatif de FORGE-IA, imagine un portfolio"));
    }

    #[test]
    fn project_prompt_lists_features() {
        let spec = ProjectSpec {
            name: "Boutique".into(),
            project_type: "ecommerce".into(),
            features: vec!["auth".into(), "stripe".into()],
            framework: "Vue 3".into(),
        };
        let prompt = project_creation_prompt(&spec);
        assert!(prompt.starts_with("Crée un projet ecommerce complet nommé \"Boutique\" avec Vue 3."));
        assert!(prompt.contains("Fonctionnalités requises: auth, stripe"));
    }
}
