use std::collections::HashSet;

use crate::logging::{self, LogOperation};
use crate::models::{new_id, CodeFile, FileTreeNode, ID};
use crate::store::{LocalStorage, StoreError};

pub const EDITOR_FILES_KEY: &str = "forge-ia-editor-files";
const DEFAULT_ACTIVE: &str = "app-tsx";

const APP_TSX: &str = r#"import React from 'react';

function App() {
  return (
    <div className="min-h-screen bg-gray-100 flex items-center justify-center">
      <div className="bg-white p-8 rounded-lg shadow-md">
        <h1 className="text-2xl font-bold mb-4">Welcome to FORGE IA</h1>
        <p className="text-gray-600">Your intelligent development orchestrator is ready!</p>
      </div>
    </div>
  );
}

export default App;"#;

const MAIN_TSX: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App.tsx';
import './index.css';

ReactDOM.createRoot(document.getElementById('root')!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>,
);"#;

const PACKAGE_JSON: &str = r#"{
  "name": "forge-ia-project",
  "version": "1.0.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "vite build",
    "preview": "vite preview"
  },
  "dependencies": {
    "react": "^18.2.0",
    "react-dom": "^18.2.0"
  },
  "devDependencies": {
    "@types/react": "^18.2.0",
    "@types/react-dom": "^18.2.0",
    "@vitejs/plugin-react": "^4.0.0",
    "typescript": "^5.0.0",
    "vite": "^4.4.0"
  }
}"#;

fn folder(id: &str, expanded: bool) -> CodeFile {
    CodeFile {
        id: id.to_string(),
        name: id.to_string(),
        content: String::new(),
        language: "folder".to_string(),
        modified: false,
        path: id.to_string(),
        is_folder: true,
        parent_id: None,
        expanded,
    }
}

fn file(id: &str, name: &str, content: &str, language: &str, path: &str, parent_id: Option<&str>) -> CodeFile {
    CodeFile {
        id: id.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        language: language.to_string(),
        modified: false,
        path: path.to_string(),
        is_folder: false,
        parent_id: parent_id.map(str::to_string),
        expanded: false,
    }
}

pub fn default_files() -> Vec<CodeFile> {
    vec![
        folder("src", true),
        file("app-tsx", "App.tsx", APP_TSX, "typescript", "src/App.tsx", Some("src")),
        file("main-tsx", "main.tsx", MAIN_TSX, "typescript", "src/main.tsx", Some("src")),
        folder("public", false),
        file("package-json", "package.json", PACKAGE_JSON, "json", "package.json", None),
    ]
}

/// Files open in the editor, with the active selection. Every change is mirrored
/// into local storage.
pub struct CodeFileStore {
    files: Vec<CodeFile>,
    active_id: Option<ID>,
    local: LocalStorage,
}

impl CodeFileStore {
    /// Restores the mirrored files, or seeds the default workspace.
    pub fn open(local: LocalStorage) -> Self {
        let files = match local.get_json::<Vec<CodeFile>>(EDITOR_FILES_KEY) {
            Ok(Some(files)) => files,
            Ok(None) => default_files(),
            Err(e) => {
                tracing::warn!(error = %e, "Editor files in local storage are unreadable, seeding defaults");
                default_files()
            }
        };
        let active_id = files
            .iter()
            .find(|f| f.id == DEFAULT_ACTIVE)
            .or_else(|| files.iter().find(|f| !f.is_folder))
            .map(|f| f.id.clone());
        Self {
            files,
            active_id,
            local,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(LocalStorage::in_memory())
    }

    pub fn files(&self) -> &[CodeFile] {
        &self.files
    }

    pub fn get(&self, id: &str) -> Option<&CodeFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_file(&self) -> Option<&CodeFile> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn set_active(&mut self, id: &str) -> Result<(), StoreError> {
        match self.get(id).map(|f| f.is_folder) {
            Some(false) => {
                self.active_id = Some(id.to_string());
                Ok(())
            }
            Some(true) => Err(StoreError::Validation(format!("{id} is a folder"))),
            None => Err(StoreError::NotFound(format!("file {id}"))),
        }
    }

    /// Adds a file under `parent` (a folder id) or at the root, and makes it active.
    pub fn create_file(
        &mut self,
        name: &str,
        content: &str,
        language: &str,
        parent: Option<&str>,
    ) -> Result<CodeFile, StoreError> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::Validation(format!("invalid file name: {name:?}")));
        }

        let path = match parent {
            Some(parent_id) => {
                let parent = self
                    .get(parent_id)
                    .ok_or_else(|| StoreError::NotFound(format!("folder {parent_id}")))?;
                if !parent.is_folder {
                    return Err(StoreError::Validation(format!("{parent_id} is not a folder")));
                }
                format!("{}/{}", parent.path, name)
            }
            None => name.to_string(),
        };
        if self.files.iter().any(|f| f.path == path) {
            return Err(StoreError::Duplicate(format!("{path} already exists")));
        }

        let created = CodeFile {
            id: new_id(),
            name: name.to_string(),
            content: content.to_string(),
            language: language.to_string(),
            modified: false,
            path,
            is_folder: false,
            parent_id: parent.map(str::to_string),
            expanded: false,
        };
        self.files.push(created.clone());
        self.active_id = Some(created.id.clone());
        self.mirror();
        tracing::debug!(file_id = %created.id, path = %created.path, "Editor file created");
        Ok(created)
    }

    pub fn update_content(&mut self, id: &str, content: &str) -> Result<(), StoreError> {
        let f = self.get_mut(id)?;
        f.content = content.to_string();
        f.modified = true;
        self.mirror();
        Ok(())
    }

    pub fn save_file(&mut self, id: &str) -> Result<(), StoreError> {
        self.get_mut(id)?.modified = false;
        self.mirror();
        Ok(())
    }

    /// Removes the entry and, for folders, everything beneath it. A removed active file
    /// hands the selection to the first remaining file.
    pub fn delete_file(&mut self, id: &str) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(format!("file {id}")));
        }

        let mut doomed: HashSet<ID> = HashSet::from([id.to_string()]);
        let mut queue = vec![id.to_string()];
        while let Some(parent) = queue.pop() {
            for child in self.files.iter().filter(|f| f.parent_id.as_deref() == Some(parent.as_str())) {
                // a parent cycle in a hand-edited mirror must not loop
                if doomed.insert(child.id.clone()) {
                    queue.push(child.id.clone());
                }
            }
        }
        self.files.retain(|f| !doomed.contains(&f.id));

        if self.active_id.as_ref().is_some_and(|a| doomed.contains(a)) {
            self.active_id = self.files.iter().find(|f| !f.is_folder).map(|f| f.id.clone());
        }
        self.mirror();
        Ok(())
    }

    pub fn toggle_folder(&mut self, id: &str) -> Result<bool, StoreError> {
        let f = self.get_mut(id)?;
        if !f.is_folder {
            return Err(StoreError::Validation(format!("{id} is not a folder")));
        }
        f.expanded = !f.expanded;
        let expanded = f.expanded;
        self.mirror();
        Ok(expanded)
    }

    /// Nested view for the explorer. Entries whose parent is missing show at the root.
    pub fn tree(&self) -> Vec<FileTreeNode> {
        let roots: Vec<&CodeFile> = self
            .files
            .iter()
            .filter(|f| match f.parent_id.as_deref() {
                Some(p) => self.get(p).is_none(),
                None => true,
            })
            .collect();
        roots.into_iter().map(|f| self.node(f)).collect()
    }

    fn node(&self, f: &CodeFile) -> FileTreeNode {
        let children = if f.is_folder {
            self.files
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(f.id.as_str()))
                .map(|c| self.node(c))
                .collect()
        } else {
            Vec::new()
        };
        FileTreeNode {
            id: f.id.clone(),
            name: f.name.clone(),
            node_type: if f.is_folder { "folder" } else { "file" }.to_string(),
            path: f.path.clone(),
            parent_id: f.parent_id.clone(),
            expanded: f.expanded,
            children,
        }
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut CodeFile, StoreError> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("file {id}")))
    }

    fn mirror(&mut self) {
        if let Err(e) = self.local.set_json(EDITOR_FILES_KEY, &self.files) {
            logging::log_mirror_failure(LogOperation::FileStore, EDITOR_FILES_KEY, &e);
        }
    }
}
