use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::Project;
use crate::orchestrator::{ProjectSpec, TaskRouter};
use crate::store::projects::default_description;

pub const AI_NOTES_FILE: &str = "FORGE_IA_NOTES.md";

/// Ordered file tree keyed by entry name.
pub type FileStructure = IndexMap<String, FileNode>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    File {
        #[serde(default)]
        content: String,
    },
    Directory {
        #[serde(default)]
        children: FileStructure,
    },
}

impl FileNode {
    pub fn file(content: impl Into<String>) -> Self {
        FileNode::File {
            content: content.into(),
        }
    }

    pub fn dir(children: FileStructure) -> Self {
        FileNode::Directory { children }
    }
}

/// Depth-first `(path, content)` pairs for every file in the tree.
pub fn flatten(files: &FileStructure) -> Vec<(String, &str)> {
    fn walk<'a>(files: &'a FileStructure, base: &str, out: &mut Vec<(String, &'a str)>) {
        for (name, node) in files {
            let path = if base.is_empty() {
                name.clone()
            } else {
                format!("{base}/{name}")
            };
            match node {
                FileNode::File { content } => out.push((path, content.as_str())),
                FileNode::Directory { children } => walk(children, &path, out),
            }
        }
    }

    let mut out = Vec::new();
    walk(files, "", &mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    React,
    Vue,
    Svelte,
    Nodejs,
    Nextjs,
    Nuxt,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
            Framework::Nodejs => "nodejs",
            Framework::Nextjs => "nextjs",
            Framework::Nuxt => "nuxt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Styling {
    Css,
    Scss,
    #[default]
    Tailwind,
    StyledComponents,
    Emotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Vercel,
    Netlify,
    Docker,
    #[default]
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGenerationOptions {
    pub template: String,
    pub framework: Framework,
    pub typescript: bool,
    pub styling: Styling,
    pub features: Vec<String>,
    pub testing: bool,
    pub linting: bool,
    pub deployment: Deployment,
}

impl Default for CodeGenerationOptions {
    fn default() -> Self {
        Self {
            template: "default".to_string(),
            framework: Framework::React,
            typescript: true,
            styling: Styling::Tailwind,
            features: Vec::new(),
            testing: false,
            linting: false,
            deployment: Deployment::Manual,
        }
    }
}

/// Starter tree rooted at a directory named after the project.
pub fn generate_project_files(project: &Project, options: &CodeGenerationOptions) -> FileStructure {
    let mut components = FileStructure::new();
    components.insert("Button.tsx".into(), FileNode::file(BUTTON_TSX));

    let mut src = FileStructure::new();
    src.insert("App.tsx".into(), FileNode::file(app_component(project, options)));
    src.insert("index.tsx".into(), FileNode::file(index_file(options)));
    src.insert("components".into(), FileNode::dir(components));

    let package_json = serde_json::to_string_pretty(&package_json(project, options)).unwrap_or_default();

    let mut root = FileStructure::new();
    root.insert("src".into(), FileNode::dir(src));
    root.insert("package.json".into(), FileNode::file(package_json));
    root.insert("README.md".into(), FileNode::file(readme(project)));

    let mut files = FileStructure::new();
    files.insert(project.name.clone(), FileNode::dir(root));
    files
}

/// Builds the starter tree, then asks the router for a project plan. A successful
/// answer lands next to the README; a failed one leaves the tree untouched.
pub async fn generate_project_code(
    router: &TaskRouter,
    project: &Project,
    options: &CodeGenerationOptions,
) -> FileStructure {
    // 1. Deterministic scaffold
    let mut files = generate_project_files(project, options);

    // 2. Plan from the assistant
    let spec = ProjectSpec {
        name: project.name.clone(),
        project_type: project.kind.as_str().to_string(),
        features: options.features.clone(),
        framework: options.framework.as_str().to_string(),
    };
    let response = router.create_project(&spec).await;

    // 3. Attach notes
    match (response.success, response.content) {
        (true, Some(notes)) => {
            if let Some(FileNode::Directory { children }) = files.get_mut(&project.name) {
                children.insert(AI_NOTES_FILE.into(), FileNode::file(notes));
            }
            tracing::info!(project_id = %project.id, model = %response.model, "Scaffold enriched with assistant notes");
        }
        _ => {
            tracing::warn!(project_id = %project.id, error = ?response.error, "Assistant unavailable, basic scaffold only");
        }
    }

    files
}

fn app_component(project: &Project, options: &CodeGenerationOptions) -> String {
    let tailwind = options.styling == Styling::Tailwind;
    let mut imports = vec!["import React from 'react';".to_string()];
    match options.styling {
        Styling::StyledComponents => imports.push("import styled from 'styled-components';".into()),
        Styling::Emotion => imports.push("import styled from '@emotion/styled';".into()),
        _ => {}
    }
    if !tailwind {
        imports.push("import './App.css';".into());
    }

    let (open, close) = if options.typescript {
        ("const App: React.FC = () => {", "};")
    } else {
        ("function App() {", "}")
    };
    let class = |tw: &'static str, plain: &'static str| if tailwind { tw } else { plain };

    format!(
        r#"{imports}

{open}
  return (
    <div className="{root}">
      <header className="{header}">
        <h1 className="{title}">
          {name}
        </h1>
        <p className="{subtitle}">
          Projet {kind} généré avec FORGE-IA
        </p>
      </header>
    </div>
  );
{close}

export default App;"#,
        imports = imports.join("\n"),
        root = class("min-h-screen bg-gray-100 flex items-center justify-center", "App"),
        header = class("text-center", "App-header"),
        title = class("text-4xl font-bold text-gray-900 mb-4", ""),
        subtitle = class("text-lg text-gray-600", ""),
        name = project.name,
        kind = project.kind.as_str(),
    )
}

fn index_file(options: &CodeGenerationOptions) -> String {
    let css = if options.styling == Styling::Tailwind {
        ""
    } else {
        "import './index.css';\n"
    };
    format!(
        r#"import React from 'react';
import {{ createRoot }} from 'react-dom/client';
import App from './App';
{css}
const container = document.getElementById('root');
const root = createRoot(container!);

root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);"#
    )
}

fn package_json(project: &Project, options: &CodeGenerationOptions) -> Value {
    let mut dependencies = Map::new();
    dependencies.insert("react".into(), json!("^18.2.0"));
    dependencies.insert("react-dom".into(), json!("^18.2.0"));
    if options.typescript {
        dependencies.insert("typescript".into(), json!("^5.0.0"));
        dependencies.insert("@types/react".into(), json!("^18.2.0"));
        dependencies.insert("@types/react-dom".into(), json!("^18.2.0"));
    }
    if options.styling == Styling::Tailwind {
        dependencies.insert("tailwindcss".into(), json!("^3.4.0"));
        dependencies.insert("autoprefixer".into(), json!("^10.4.0"));
        dependencies.insert("postcss".into(), json!("^8.4.0"));
    }

    let mut scripts = Map::new();
    scripts.insert("start".into(), json!("react-scripts start"));
    scripts.insert("build".into(), json!("react-scripts build"));
    if options.testing {
        scripts.insert("test".into(), json!("react-scripts test"));
    }
    scripts.insert("eject".into(), json!("react-scripts eject"));

    let dev_dependencies = if options.linting {
        json!({
            "@typescript-eslint/eslint-plugin": "^6.0.0",
            "@typescript-eslint/parser": "^6.0.0",
            "eslint": "^8.0.0"
        })
    } else {
        json!({})
    };

    json!({
        "name": project.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"),
        "version": "1.0.0",
        "description": project.description.clone().unwrap_or_else(|| default_description(project.kind)),
        "main": "src/index.tsx",
        "scripts": scripts,
        "dependencies": dependencies,
        "devDependencies": dev_dependencies,
    })
}

fn readme(project: &Project) -> String {
    let date = time::OffsetDateTime::now_utc()
        .format(time::macros::format_description!("[day]/[month]/[year]"))
        .unwrap_or_default();
    let description = project
        .description
        .clone()
        .unwrap_or_else(|| default_description(project.kind));
    let technologies = project
        .tech_stack
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "# {name}\n\n{description}\n\n\
         ## 🚀 Technologies utilisées\n\n{technologies}\n\n\
         ## 📦 Installation\n\n```bash\nnpm install\n```\n\n\
         ## 🛠️ Développement\n\n```bash\nnpm start\n```\n\n\
         ## 🏗️ Build\n\n```bash\nnpm run build\n```\n\n\
         ## 📄 Génération\n\n\
         Ce projet a été généré avec **FORGE-IA** - Votre assistant de développement intelligent.\n\n\
         Créé le: {date}\n",
        name = project.name,
    )
}

const BUTTON_TSX: &str = r#"import React from 'react';

interface ButtonProps {
  children: React.ReactNode;
  onClick?: () => void;
  variant?: 'primary' | 'secondary';
  disabled?: boolean;
}

export const Button: React.FC<ButtonProps> = ({
  children,
  onClick,
  variant = 'primary',
  disabled = false
}) => {
  const baseClasses = "px-4 py-2 rounded-lg font-medium transition-colors";
  const variantClasses = {
    primary: "bg-blue-600 text-white hover:bg-blue-700 disabled:opacity-50",
    secondary: "bg-gray-200 text-gray-800 hover:bg-gray-300 disabled:opacity-50"
  };

  return (
    <button
      onClick={onClick}
      disabled={disabled}
      className={`${baseClasses} ${variantClasses[variant]}`}
    >
      {children}
    </button>
  );
};"#;
