pub mod files;
pub mod local;
pub mod projects;

use thiserror::Error;

pub use files::CodeFileStore;
pub use local::LocalStorage;
pub use projects::{NewProject, ProjectExport, ProjectStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Db(#[from] crate::db::DbError),
}
