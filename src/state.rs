//! Shared application state handed to the desktop shell.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::assistant::AssistantSession;
use crate::config::AppConfig;
use crate::db;
use crate::orchestrator::TaskRouter;
use crate::search::SearchIndex;
use crate::store::{CodeFileStore, LocalStorage, ProjectStore};

pub struct AppState {
    pub data_dir: PathBuf,
    pub db_path: Option<PathBuf>,
    pub router: Arc<TaskRouter>,
    pub session: tokio::sync::Mutex<AssistantSession>,
    pub projects: Mutex<ProjectStore>,
    pub files: Mutex<CodeFileStore>,
    pub search: Mutex<SearchIndex>,
}

impl AppState {
    /// Opens the database (falling back to local storage only when it cannot be opened),
    /// overlays stored settings on the environment config and builds the router once.
    pub fn init(mut config: AppConfig) -> Self {
        let paths = match db::paths(&config.data_dir) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(dir = %config.data_dir.display(), error = %e, "Data directory unavailable, state kept in memory");
                None
            }
        };

        let conn = paths.as_ref().and_then(|p| match db::open(&p.db_path) {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!(path = %p.db_path.display(), error = %e, "Database unavailable, using local storage only");
                None
            }
        });

        if let Some(conn) = &conn {
            match db::settings_map(conn) {
                Ok(settings) => config.ai.apply_settings(&settings),
                Err(e) => tracing::warn!(error = %e, "Reading stored settings failed"),
            }
        }

        let (projects_local, editor_local) = match &paths {
            Some(p) => (
                LocalStorage::open(&p.projects_storage_path),
                LocalStorage::open(&p.editor_storage_path),
            ),
            None => (LocalStorage::in_memory(), LocalStorage::in_memory()),
        };

        let router = Arc::new(TaskRouter::from_config(&config.ai));
        let db_path = if conn.is_some() {
            paths.map(|p| p.db_path)
        } else {
            None
        };

        tracing::info!(
            data_dir = %config.data_dir.display(),
            backed = db_path.is_some(),
            configured = router.is_configured(),
            "Application state ready"
        );

        Self {
            data_dir: config.data_dir,
            db_path,
            session: tokio::sync::Mutex::new(AssistantSession::new(router.clone())),
            router,
            projects: Mutex::new(ProjectStore::open(conn, projects_local)),
            files: Mutex::new(CodeFileStore::open(editor_local)),
            search: Mutex::new(SearchIndex::new()),
        }
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}
