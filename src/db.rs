use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::*;

#[derive(Debug, Error)]
pub enum DbError {
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// One local storage file per store, so the two mirrors never overwrite each other.
pub struct DbPaths {
  pub db_path: PathBuf,
  pub projects_storage_path: PathBuf,
  pub editor_storage_path: PathBuf,
}

pub fn paths(data_dir: &Path) -> Result<DbPaths, DbError> {
  std::fs::create_dir_all(data_dir)?;
  Ok(DbPaths {
    db_path: data_dir.join("forge-ia.sqlite"),
    projects_storage_path: data_dir.join("projects-storage.json"),
    editor_storage_path: data_dir.join("editor-storage.json"),
  })
}

pub fn connect(db_path: &Path) -> Result<Connection, DbError> {
  let conn = Connection::open(db_path)?;
  Ok(conn)
}

/// Opens the database and applies the embedded schema. Used by the app state at startup.
pub fn open(db_path: &Path) -> Result<Connection, DbError> {
  let conn = connect(db_path)?;
  init_db(&conn)?;
  Ok(conn)
}

pub fn open_in_memory() -> Result<Connection, DbError> {
  let conn = Connection::open_in_memory()?;
  init_db(&conn)?;
  Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<(), DbError> {
  // Uses IF NOT EXISTS for idempotency.
  let init_sql = include_str!("../migrations/001_init.sql");
  conn.execute_batch(init_sql)?;
  Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Vec<SettingsKV>, DbError> {
  let mut stmt = conn.prepare("SELECT key, value, updated_at FROM settings ORDER BY key")?;
  let rows = stmt.query_map([], |r| {
    Ok(SettingsKV {
      key: r.get(0)?,
      value: r.get(1)?,
      updated_at: r.get(2)?,
    })
  })?;

  let mut out = vec![];
  for row in rows {
    out.push(row?);
  }
  Ok(out)
}

pub fn settings_map(conn: &Connection) -> Result<HashMap<String, String>, DbError> {
  Ok(get_settings(conn)?.into_iter().map(|kv| (kv.key, kv.value)).collect())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
  let value = conn
    .query_row("SELECT value FROM settings WHERE key = ?1", [key], |r| r.get(0))
    .optional()?;
  Ok(value)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
  let updated_at = now_iso();
  conn.execute(
    "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
    (key, value, &updated_at),
  )?;
  Ok(())
}

pub fn set_settings(conn: &mut Connection, pairs: &[SettingInput]) -> Result<(), DbError> {
  let tx = conn.transaction()?;
  let updated_at = now_iso();

  for pair in pairs {
    tx.execute(
      "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
      (&pair.key, &pair.value, &updated_at),
    )?;
  }

  tx.commit()?;
  Ok(())
}
