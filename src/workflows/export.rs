use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::logging::LogOperation;
use crate::models::{now_iso, Project};
use crate::store::projects::{default_description, ExportMetadata, ExportedProject, ProjectExport};
use crate::workflows::scaffold::{flatten, FileNode, FileStructure};

pub const FORGE_IA_VERSION: &str = "2.0.0";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("unsafe archive entry: {0}")]
    UnsafePath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Zip,
    Outline,
    Github,
    Codesandbox,
    Stackblitz,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Zip => "zip",
            ExportFormat::Outline => "outline",
            ExportFormat::Github => "github",
            ExportFormat::Codesandbox => "codesandbox",
            ExportFormat::Stackblitz => "stackblitz",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    #[serde(default)]
    pub include_assets: bool,
    #[serde(default)]
    pub minify: bool,
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default)]
    pub include_docs: bool,
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            include_assets: false,
            minify: false,
            include_tests: false,
            include_docs: false,
        }
    }
}

/// Where the export ended up: a written file, a URL to open, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

/// Keeps ASCII letters and digits, everything else becomes `-`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

pub fn export_project(
    project: &Project,
    files: &FileStructure,
    options: &ExportOptions,
    out_dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    tracing::info!(
        operation = LogOperation::Export.as_str(),
        project_id = %project.id,
        format = options.format.as_str(),
        "Exporting project"
    );

    let safe = sanitize_name(&project.name);
    let outcome = match options.format {
        ExportFormat::Json => {
            let path = out_dir.join(format!("{safe}-export-{}.json", timestamp_millis()));
            write_text(&path, &serde_json::to_string_pretty(&export_document(project, files))?)?;
            ExportOutcome { path: Some(path), url: None }
        }
        ExportFormat::Zip => {
            let path = out_dir.join(format!("{safe}-{}.zip", timestamp_millis()));
            write_zip(&path, files, options.minify)?;
            ExportOutcome { path: Some(path), url: None }
        }
        ExportFormat::Outline => {
            let path = out_dir.join(format!("{safe}-structure.txt"));
            write_text(&path, &outline(project, files))?;
            ExportOutcome { path: Some(path), url: None }
        }
        ExportFormat::Github => {
            let path = out_dir.join(format!("deploy-{safe}-to-github.sh"));
            write_text(&path, &github_deploy_script(project))?;
            ExportOutcome { path: Some(path), url: None }
        }
        ExportFormat::Codesandbox => ExportOutcome {
            path: None,
            url: Some("https://codesandbox.io/s/new?file=/src/App.tsx".to_string()),
        },
        ExportFormat::Stackblitz => ExportOutcome {
            path: None,
            url: Some(format!(
                "https://stackblitz.com/fork/react-ts?title={}",
                urlencoding::encode(&project.name)
            )),
        },
    };

    tracing::info!(
        operation = LogOperation::Export.as_str(),
        project_id = %project.id,
        path = ?outcome.path,
        url = ?outcome.url,
        "Export finished"
    );
    Ok(outcome)
}

pub fn export_document(project: &Project, files: &FileStructure) -> ProjectExport {
    ProjectExport {
        project: ExportedProject {
            id: project.id.clone(),
            name: project.name.clone(),
            kind: project.kind,
            tech_stack: project.tech_stack.clone(),
            created_at: project.created_at.clone(),
            description: Some(
                project
                    .description
                    .clone()
                    .unwrap_or_else(|| default_description(project.kind)),
            ),
        },
        files: files.clone(),
        metadata: ExportMetadata {
            exported_at: now_iso(),
            forge_ia_version: FORGE_IA_VERSION.to_string(),
            export_format: ExportFormat::Json.as_str().to_string(),
        },
    }
}

/// Plain-text listing of the tree, one entry per line.
pub fn outline(project: &Project, files: &FileStructure) -> String {
    fn walk(files: &FileStructure, indent: &str, out: &mut String) {
        for (name, node) in files {
            match node {
                FileNode::Directory { children } => {
                    out.push_str(&format!("{indent}📁 {name}\n"));
                    walk(children, &format!("{indent}  "), out);
                }
                FileNode::File { .. } => out.push_str(&format!("{indent}📄 {name}\n")),
            }
        }
    }

    let mut out = format!(
        "# {}\n\nType: {}\nTechnologies: {}\nCréé: {}\n\n## Structure des fichiers:\n\n",
        project.name,
        project.kind.as_str(),
        project.tech_stack.join(", "),
        project.created_at
    );
    walk(files, "", &mut out);
    out.push_str("\n## Généré par FORGE-IA V2\n");
    out.push_str(&format!("Export réalisé le: {}\n", now_iso()));
    out
}

/// Quotes `value` for a POSIX shell, so names and descriptions are never expanded.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn github_deploy_script(project: &Project) -> String {
    let safe = sanitize_name(&project.name);
    let description = project
        .description
        .as_deref()
        .unwrap_or("Projet généré avec FORGE-IA");
    format!(
        r#"#!/bin/bash
# Script de déploiement GitHub pour {safe}
# Généré par FORGE-IA V2

PROJECT_NAME={name}
REPO_NAME={repo}
DESCRIPTION={description}

echo "🚀 Déploiement de $PROJECT_NAME sur GitHub..."

gh repo create "$REPO_NAME" --public --description "$DESCRIPTION"

git init
git add .
git commit -m "Initial commit - Generated by FORGE-IA V2"

git branch -M main
git remote add origin "https://github.com/$USERNAME/$REPO_NAME.git"
git push -u origin main

echo "✅ Projet déployé sur GitHub!"
echo "🌐 URL: https://github.com/$USERNAME/$REPO_NAME"
"#,
        name = shell_quote(&project.name),
        repo = shell_quote(&safe),
        description = shell_quote(description),
    )
}

fn write_text(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn write_zip(path: &Path, files: &FileStructure, minify: bool) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let method = if minify {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let entry_options = SimpleFileOptions::default().compression_method(method);

    // empty files are skipped
    let entries: Vec<_> = flatten(files).into_iter().filter(|(_, c)| !c.is_empty()).collect();
    if let Some((name, _)) = entries.iter().find(|(name, _)| !is_relative_entry(name)) {
        return Err(ExportError::UnsafePath(name.clone()));
    }

    let mut zip = ZipWriter::new(File::create(path)?);
    for (name, content) in entries {
        zip.start_file(name, entry_options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Entry names must stay inside the archive root: no `..`, no root or drive prefix.
fn is_relative_entry(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('\\')
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn timestamp_millis() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProjectStore;
    use crate::workflows::scaffold::tests::sample_project;
    use crate::workflows::scaffold::{generate_project_files, CodeGenerationOptions};
    use std::io::Read;
    use tempfile::TempDir;

    fn sample() -> (Project, FileStructure) {
        let project = sample_project();
        let files = generate_project_files(&project, &CodeGenerationOptions::default());
        (project, files)
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_name("My Shop!"), "My-Shop-");
        assert_eq!(sanitize_name("été-2024"), "-t--2024");
    }

    #[test]
    fn json_export_can_be_imported() {
        let temp = TempDir::new().unwrap();
        let (project, files) = sample();

        let outcome = export_project(&project, &files, &ExportOptions::new(ExportFormat::Json), temp.path()).unwrap();
        let path = outcome.path.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("My-Shop-export-") && name.ends_with(".json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["metadata"]["forge_ia_version"], "2.0.0");
        assert_eq!(doc["project"]["description"], "Projet web créé avec FORGE-IA");

        let mut store = ProjectStore::in_memory();
        let imported = store.import_json(&raw).unwrap();
        assert_eq!(imported.name, "My Shop");
        assert_eq!(imported.tech_stack, project.tech_stack);
    }

    #[test]
    fn zip_compression_follows_minify() {
        let temp = TempDir::new().unwrap();
        let (project, files) = sample();

        for (minify, expected) in [(true, CompressionMethod::Deflated), (false, CompressionMethod::Stored)] {
            let options = ExportOptions { minify, ..ExportOptions::new(ExportFormat::Zip) };
            let dir = temp.path().join(minify.to_string());
            let path = export_project(&project, &files, &options, &dir).unwrap().path.unwrap();

            let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
            assert_eq!(archive.len(), 5);
            let mut entry = archive.by_name("My Shop/README.md").unwrap();
            assert_eq!(entry.compression(), expected);
            let mut readme = String::new();
            entry.read_to_string(&mut readme).unwrap();
            assert!(readme.starts_with("# My Shop"));
        }
    }

    #[test]
    fn outline_and_script_are_written() {
        let temp = TempDir::new().unwrap();
        let (project, files) = sample();

        let path = export_project(&project, &files, &ExportOptions::new(ExportFormat::Outline), temp.path())
            .unwrap()
            .path
            .unwrap();
        assert!(path.ends_with("My-Shop-structure.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Technologies: React, Tailwind"));
        assert!(text.contains("📁 My Shop\n  📁 src\n    📄 App.tsx"));

        let path = export_project(&project, &files, &ExportOptions::new(ExportFormat::Github), temp.path())
            .unwrap()
            .path
            .unwrap();
        assert!(path.ends_with("deploy-My-Shop-to-github.sh"));
        let script = std::fs::read_to_string(path).unwrap();
        assert!(script.contains("REPO_NAME='My-Shop'"));
        assert!(script.contains(r#"gh repo create "$REPO_NAME" --public --description "$DESCRIPTION""#));
    }

    #[test]
    fn script_values_are_single_quoted() {
        let (mut project, _) = sample();
        project.name = r#"Shop "$(rm -rf /)" it's"#.to_string();
        project.description = Some("`reboot` & $HOME".to_string());

        let script = github_deploy_script(&project);
        assert!(script.contains(r#"PROJECT_NAME='Shop "$(rm -rf /)" it'\''s'"#));
        assert!(script.contains("DESCRIPTION='`reboot` & $HOME'"));
        assert!(script.contains("# Script de déploiement GitHub pour Shop----rm--rf-----it-s"));
        assert!(!script.contains(r#"echo "🚀 Déploiement de Shop"#));
    }

    #[test]
    fn zip_rejects_entries_outside_the_root() {
        let temp = TempDir::new().unwrap();
        let (project, _) = sample();

        for bad in ["../evil.sh", "/abs.sh"] {
            let mut files = FileStructure::new();
            files.insert(bad.to_string(), FileNode::File { content: "echo pwned".into() });

            let err = export_project(&project, &files, &ExportOptions::new(ExportFormat::Zip), temp.path()).unwrap_err();
            assert!(matches!(err, ExportError::UnsafePath(name) if name == bad));
        }
        let zips = std::fs::read_dir(temp.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "zip"))
            .count();
        assert_eq!(zips, 0);
        assert!(is_relative_entry("My Shop/src/App.tsx"));
    }

    #[test]
    fn hosted_sandboxes_return_urls() {
        let temp = TempDir::new().unwrap();
        let (project, files) = sample();

        let out = export_project(&project, &files, &ExportOptions::new(ExportFormat::Stackblitz), temp.path()).unwrap();
        assert_eq!(out.url.as_deref(), Some("https://stackblitz.com/fork/react-ts?title=My%20Shop"));
        assert!(out.path.is_none());

        let out = export_project(&project, &files, &ExportOptions::new(ExportFormat::Codesandbox), temp.path()).unwrap();
        assert!(out.url.unwrap().starts_with("https://codesandbox.io/"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
