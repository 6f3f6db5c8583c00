use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::logging::{self, LogOperation};
use crate::models::*;
use crate::store::{LocalStorage, StoreError};
use crate::workflows::scaffold::FileStructure;

pub const PROJECTS_KEY: &str = "forge-ia-projects";
const OWNER_ID: &str = "current-user";
const INITIAL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Project fields carried by a JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedProject {
    pub id: ID,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub exported_at: String,
    pub forge_ia_version: String,
    pub export_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectExport {
    pub project: ExportedProject,
    #[serde(default)]
    pub files: FileStructure,
    pub metadata: ExportMetadata,
}

pub fn default_description(kind: ProjectType) -> String {
    format!("Projet {} créé avec FORGE-IA", kind.as_str())
}

/// In-memory projects with the current selection. SQLite is the backing service when
/// available; the local storage mirror is always written.
pub struct ProjectStore {
    projects: Vec<Project>,
    current: Option<ID>,
    db: Option<Connection>,
    local: LocalStorage,
}

impl ProjectStore {
    pub fn open(db: Option<Connection>, local: LocalStorage) -> Self {
        let projects = match db.as_ref().map(select_projects) {
            Some(Ok(projects)) => projects,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Loading projects from database failed, using local storage");
                load_local(&local)
            }
            None => load_local(&local),
        };
        tracing::info!(
            operation = LogOperation::ProjectStore.as_str(),
            count = projects.len(),
            backed = db.is_some(),
            "Projects loaded"
        );
        Self {
            projects,
            current: None,
            db,
            local,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(None, LocalStorage::in_memory())
    }

    pub fn is_backed(&self) -> bool {
        self.db.is_some()
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&Project> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    pub fn db(&self) -> Option<&Connection> {
        self.db.as_ref()
    }

    pub fn db_mut(&mut self) -> Option<&mut Connection> {
        self.db.as_mut()
    }

    pub fn create(&mut self, input: NewProject) -> Result<Project, StoreError> {
        let name = input.name.trim().to_string();
        self.validate_name(&name, input.kind, None)?;

        let ts = now_iso();
        let project = Project {
            id: new_id(),
            name,
            kind: input.kind,
            tech_stack: input.technologies,
            created_at: ts.clone(),
            updated_at: ts,
            owner_id: OWNER_ID.to_string(),
            git_url: None,
            status: ProjectStatus::InDevelopment,
            description: Some(default_description(input.kind)),
            version: Some(INITIAL_VERSION.to_string()),
        };

        self.insert(project.clone());
        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Makes the project current. Returns `None` for an unknown id.
    pub fn load(&mut self, id: &str) -> Option<&Project> {
        if self.get(id).is_none() {
            return None;
        }
        self.current = Some(id.to_string());
        self.get(id)
    }

    /// Renames and type changes go through the same name rules as `create`.
    pub fn update(&mut self, id: &str, patch: ProjectPatch) -> Result<Project, StoreError> {
        let existing = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("project {id}")))?;
        let name = patch.name.as_deref().map(|n| n.trim().to_string());
        let kind = patch.kind.unwrap_or(existing.kind);
        if name.is_some() || patch.kind.is_some() {
            let candidate = name.clone().unwrap_or_else(|| existing.name.clone());
            self.validate_name(&candidate, kind, Some(id))?;
        }

        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("project {id}")))?;

        if let Some(name) = name {
            project.name = name;
        }
        project.kind = kind;
        if let Some(tech_stack) = patch.tech_stack {
            project.tech_stack = tech_stack;
        }
        if let Some(git_url) = patch.git_url {
            project.git_url = Some(git_url);
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(version) = patch.version {
            project.version = Some(version);
        }
        project.updated_at = now_iso();

        let updated = project.clone();
        self.write_through(&updated);
        Ok(updated)
    }

    /// Inserts or replaces by id.
    pub fn save(&mut self, mut project: Project) -> Project {
        project.updated_at = now_iso();
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => self.projects.push(project.clone()),
        }
        self.write_through(&project);
        project
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return false;
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        if let Some(conn) = &self.db {
            if let Err(e) = conn.execute("DELETE FROM projects WHERE id = ?1", [id]) {
                tracing::warn!(project_id = id, error = %e, "Deleting project from database failed");
            }
        }
        self.mirror();
        true
    }

    /// Adds a project from a JSON export. Malformed input changes nothing.
    pub fn import_json(&mut self, raw: &str) -> Result<Project, StoreError> {
        let export: ProjectExport = serde_json::from_str(raw)?;
        let exported = export.project;
        let name = exported.name.trim().to_string();
        self.validate_name(&name, exported.kind, None)?;

        let id = if exported.id.is_empty() || self.get(&exported.id).is_some() {
            new_id()
        } else {
            exported.id
        };

        let project = Project {
            id,
            name,
            kind: exported.kind,
            tech_stack: exported.tech_stack,
            created_at: exported.created_at,
            updated_at: now_iso(),
            owner_id: OWNER_ID.to_string(),
            git_url: None,
            status: ProjectStatus::InDevelopment,
            description: exported.description.or_else(|| Some(default_description(exported.kind))),
            version: Some(INITIAL_VERSION.to_string()),
        };

        self.insert(project.clone());
        tracing::info!(project_id = %project.id, "Project imported");
        Ok(project)
    }

    /// `exclude` is the project being renamed, which may keep its own name.
    fn validate_name(&self, name: &str, kind: ProjectType, exclude: Option<&str>) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::Validation("Nom du projet requis".into()));
        }
        let lower = name.to_lowercase();
        if self
            .projects
            .iter()
            .any(|p| Some(p.id.as_str()) != exclude && p.kind == kind && p.name.to_lowercase() == lower)
        {
            return Err(StoreError::Duplicate(format!(
                "Un projet \"{}\" de type {} existe déjà. Choisissez un autre nom.",
                name,
                kind.as_str()
            )));
        }
        Ok(())
    }

    fn insert(&mut self, project: Project) {
        self.current = Some(project.id.clone());
        self.write_through(&project);
        self.projects.push(project);
        self.mirror();
    }

    fn write_through(&mut self, project: &Project) {
        if let Some(conn) = &self.db {
            if let Err(e) = upsert_project(conn, project) {
                tracing::warn!(project_id = %project.id, error = %e, "Backing database unavailable, kept in local storage only");
            }
        }
        self.mirror();
    }

    fn mirror(&mut self) {
        if let Err(e) = self.local.set_json(PROJECTS_KEY, &self.projects) {
            logging::log_mirror_failure(LogOperation::ProjectStore, PROJECTS_KEY, &e);
        }
    }
}

fn load_local(local: &LocalStorage) -> Vec<Project> {
    match local.get_json::<Vec<Project>>(PROJECTS_KEY) {
        Ok(projects) => projects.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Projects in local storage are unreadable");
            Vec::new()
        }
    }
}

fn select_projects(conn: &Connection) -> Result<Vec<Project>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, tech_stack_json, created_at, updated_at, owner_id, git_url, status, description, version
         FROM projects ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map([], |r| {
        let kind: String = r.get(2)?;
        let tech_stack_json: String = r.get(3)?;
        let status: String = r.get(8)?;
        Ok(Project {
            id: r.get(0)?,
            name: r.get(1)?,
            kind: ProjectType::parse(&kind).unwrap_or(ProjectType::Web),
            tech_stack: serde_json::from_str(&tech_stack_json).unwrap_or_default(),
            created_at: r.get(4)?,
            updated_at: r.get(5)?,
            owner_id: r.get(6)?,
            git_url: r.get(7)?,
            status: ProjectStatus::parse(&status).unwrap_or(ProjectStatus::InDevelopment),
            description: r.get(9)?,
            version: r.get(10)?,
        })
    })?;

    let mut out = vec![];
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn upsert_project(conn: &Connection, p: &Project) -> Result<(), DbError> {
    let tech_stack_json = serde_json::to_string(&p.tech_stack).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO projects (id, name, type, tech_stack_json, created_at, updated_at, owner_id, git_url, status, description, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, type=excluded.type, tech_stack_json=excluded.tech_stack_json,
           updated_at=excluded.updated_at, git_url=excluded.git_url, status=excluded.status,
           description=excluded.description, version=excluded.version",
        rusqlite::params![
            p.id,
            p.name,
            p.kind.as_str(),
            tech_stack_json,
            p.created_at,
            p.updated_at,
            p.owner_id,
            p.git_url,
            p.status.as_str(),
            p.description,
            p.version,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;
    use tempfile::TempDir;

    fn new_web(name: &str) -> NewProject {
        NewProject {
            name: name.into(),
            kind: ProjectType::Web,
            technologies: vec!["React".into()],
        }
    }

    #[test]
    fn create_sets_defaults_and_current() {
        let mut store = ProjectStore::in_memory();
        let p = store.create(new_web("  Shop  ")).unwrap();

        assert_eq!(p.name, "Shop");
        assert_eq!(p.status, ProjectStatus::InDevelopment);
        assert_eq!(p.version.as_deref(), Some("1.0.0"));
        assert_eq!(p.description.as_deref(), Some("Projet web créé avec FORGE-IA"));
        assert_eq!(store.current().map(|c| c.id.clone()), Some(p.id));
    }

    #[test]
    fn duplicate_name_same_type_rejected() {
        let mut store = ProjectStore::in_memory();
        store.create(new_web("Shop")).unwrap();

        let err = store.create(new_web("SHOP")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // same name, other type is fine
        let api = NewProject { kind: ProjectType::Api, ..new_web("Shop") };
        assert!(store.create(api).is_ok());
        assert!(matches!(store.create(new_web("   ")), Err(StoreError::Validation(_))));
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn update_and_delete_track_current() {
        let mut store = ProjectStore::in_memory();
        let a = store.create(new_web("A")).unwrap();
        let b = store.create(new_web("B")).unwrap();
        assert!(store.load(&a.id).is_some());

        let patch = ProjectPatch {
            status: Some(ProjectStatus::Active),
            git_url: Some("https://github.com/me/a".into()),
            ..ProjectPatch::default()
        };
        let updated = store.update(&a.id, patch).unwrap();
        assert_eq!(updated.status, ProjectStatus::Active);
        assert_eq!(store.current().unwrap().status, ProjectStatus::Active);

        assert!(matches!(
            store.update("nope", ProjectPatch::default()),
            Err(StoreError::NotFound(_))
        ));

        assert!(store.delete(&a.id));
        assert!(store.current().is_none());
        assert!(!store.delete(&a.id));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].id, b.id);
        assert!(store.load("missing").is_none());
    }

    #[test]
    fn update_applies_name_rules() {
        let mut store = ProjectStore::in_memory();
        let shop = store.create(new_web("Shop")).unwrap();
        let other = store.create(new_web("Other")).unwrap();

        let rename = |name: &str| ProjectPatch {
            name: Some(name.into()),
            ..ProjectPatch::default()
        };
        assert!(matches!(store.update(&other.id, rename("SHOP")), Err(StoreError::Duplicate(_))));
        assert!(matches!(store.update(&other.id, rename("   ")), Err(StoreError::Validation(_))));
        assert_eq!(store.get(&other.id).unwrap().name, "Other");

        // keeping its own name with different case is fine
        assert_eq!(store.update(&shop.id, rename(" shop ")).unwrap().name, "shop");

        let api = store
            .create(NewProject { kind: ProjectType::Api, ..new_web("Other") })
            .unwrap();
        let to_web = ProjectPatch {
            kind: Some(ProjectType::Web),
            ..ProjectPatch::default()
        };
        assert!(matches!(store.update(&api.id, to_web), Err(StoreError::Duplicate(_))));
        assert_eq!(store.get(&api.id).unwrap().kind, ProjectType::Api);
    }

    #[test]
    fn local_mirror_restores_projects() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("local.json");

        let mut store = ProjectStore::open(None, LocalStorage::open(&path));
        let p = store.create(new_web("Persisted")).unwrap();
        drop(store);

        let store = ProjectStore::open(None, LocalStorage::open(&path));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get(&p.id).unwrap().name, "Persisted");
        assert!(!store.is_backed());
    }

    #[test]
    fn database_is_preferred_over_mirror() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("forge.sqlite");

        let mut store = ProjectStore::open(Some(db::open(&db_path).unwrap()), LocalStorage::in_memory());
        let p = store.create(new_web("Backed")).unwrap();
        store.save(Project { tech_stack: vec!["Vue".into()], ..p.clone() });
        drop(store);

        let store = ProjectStore::open(Some(db::open(&db_path).unwrap()), LocalStorage::in_memory());
        assert!(store.is_backed());
        let loaded = store.get(&p.id).unwrap();
        assert_eq!(loaded.tech_stack, vec!["Vue".to_string()]);
        assert_eq!(loaded.kind, ProjectType::Web);
    }

    #[test]
    fn import_rejects_malformed_json_without_changes() {
        let mut store = ProjectStore::in_memory();
        store.create(new_web("Existing")).unwrap();

        assert!(matches!(store.import_json("{ nope"), Err(StoreError::Json(_))));
        assert!(matches!(
            store.import_json(r#"{"project": {"name": "x"}}"#),
            Err(StoreError::Json(_))
        ));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn import_assigns_fresh_id_on_collision() {
        let mut store = ProjectStore::in_memory();
        let existing = store.create(new_web("Existing")).unwrap();

        let raw = json!({
            "project": {
                "id": existing.id,
                "name": "Imported",
                "type": "mobile",
                "tech_stack": ["Flutter"],
                "created_at": "2024-01-01T00:00:00Z"
            },
            "files": {},
            "metadata": {
                "exported_at": "2024-01-02T00:00:00Z",
                "forge_ia_version": "2.0.0",
                "export_format": "json"
            }
        })
        .to_string();

        let imported = store.import_json(&raw).unwrap();
        assert_ne!(imported.id, existing.id);
        assert_eq!(imported.kind, ProjectType::Mobile);
        assert_eq!(imported.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(store.current().unwrap().id, imported.id);
        assert_eq!(store.list().len(), 2);
    }
}
