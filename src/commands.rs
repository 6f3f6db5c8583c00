use std::sync::{Mutex, MutexGuard};

use tauri::State;

use crate::assistant::{AiModel, AssistantSession, ChatRequest};
use crate::db;
use crate::models::*;
use crate::orchestrator::{AiResponse, ProjectSpec};
use crate::search::{SearchItemType, SearchableItem};
use crate::state::AppState;
use crate::store::NewProject;
use crate::workflows::{self, CodeGenerationOptions, ExportOptions, ExportOutcome, FileStructure};

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
  m.lock().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn db_health(state: State<'_, AppState>) -> Result<serde_json::Value, String> {
  Ok(serde_json::json!({
    "ok": state.db_path.is_some(),
    "path": state.db_path.as_ref().map(|p| p.to_string_lossy().to_string()),
    "ai_configured": state.router.is_configured(),
  }))
}

// Chat

#[tauri::command]
pub async fn send_message(state: State<'_, AppState>, message: String) -> Result<AiResponse, String> {
  Ok(AssistantSession::dispatch(&state.session, ChatRequest::Message(message)).await)
}

#[tauri::command]
pub async fn handle_user_input(state: State<'_, AppState>, message: String) -> Result<AiResponse, String> {
  Ok(AssistantSession::dispatch(&state.session, ChatRequest::UserInput(message)).await)
}

#[tauri::command]
pub async fn generate_code(state: State<'_, AppState>, prompt: String, language: String) -> Result<AiResponse, String> {
  let request = ChatRequest::GenerateCode { prompt, language };
  Ok(AssistantSession::dispatch(&state.session, request).await)
}

#[tauri::command]
pub async fn analyze_code(state: State<'_, AppState>, code: String, language: String) -> Result<AiResponse, String> {
  let request = ChatRequest::AnalyzeCode { code, language };
  Ok(AssistantSession::dispatch(&state.session, request).await)
}

#[tauri::command]
pub async fn create_project_with_ai(state: State<'_, AppState>, spec: ProjectSpec) -> Result<AiResponse, String> {
  Ok(AssistantSession::dispatch(&state.session, ChatRequest::CreateProject(spec)).await)
}

#[tauri::command]
pub async fn select_model(state: State<'_, AppState>, model_id: String) -> Result<bool, String> {
  Ok(state.session.lock().await.select_model(&model_id))
}

#[tauri::command]
pub async fn clear_chat(state: State<'_, AppState>) -> Result<(), String> {
  state.session.lock().await.clear_chat();
  Ok(())
}

#[tauri::command]
pub async fn chat_history(state: State<'_, AppState>) -> Result<Vec<ChatMessage>, String> {
  Ok(state.session.lock().await.history().to_vec())
}

#[tauri::command]
pub async fn tokens_used(state: State<'_, AppState>) -> Result<u64, String> {
  Ok(state.session.lock().await.tokens_used())
}

#[tauri::command]
pub async fn list_models(state: State<'_, AppState>) -> Result<serde_json::Value, String> {
  let session = state.session.lock().await;
  let models: Vec<AiModel> = session.models().to_vec();
  Ok(serde_json::json!({
    "models": models,
    "active": session.active_model().id,
  }))
}

// Projects

#[tauri::command]
pub fn list_projects(state: State<'_, AppState>) -> Result<Vec<Project>, String> {
  Ok(lock(&state.projects)?.list().to_vec())
}

#[tauri::command]
pub fn create_project(state: State<'_, AppState>, input: NewProject) -> Result<Project, String> {
  lock(&state.projects)?.create(input).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_project(state: State<'_, AppState>, project_id: String) -> Result<Project, String> {
  lock(&state.projects)?
    .get(&project_id)
    .cloned()
    .ok_or_else(|| format!("project not found: {project_id}"))
}

#[tauri::command]
pub fn load_project(state: State<'_, AppState>, project_id: String) -> Result<Project, String> {
  lock(&state.projects)?
    .load(&project_id)
    .cloned()
    .ok_or_else(|| format!("project not found: {project_id}"))
}

#[tauri::command]
pub fn current_project(state: State<'_, AppState>) -> Result<Option<Project>, String> {
  Ok(lock(&state.projects)?.current().cloned())
}

#[tauri::command]
pub fn update_project(state: State<'_, AppState>, project_id: String, patch: ProjectPatch) -> Result<Project, String> {
  lock(&state.projects)?.update(&project_id, patch).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_project(state: State<'_, AppState>, project_id: String) -> Result<bool, String> {
  Ok(lock(&state.projects)?.delete(&project_id))
}

#[tauri::command]
pub fn import_project(state: State<'_, AppState>, raw: String) -> Result<Project, String> {
  lock(&state.projects)?.import_json(&raw).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn generate_project_code(
  state: State<'_, AppState>,
  project_id: String,
  options: CodeGenerationOptions,
) -> Result<FileStructure, String> {
  let project = {
    let projects = lock(&state.projects)?;
    projects.get(&project_id).cloned().ok_or_else(|| format!("project not found: {project_id}"))?
  };
  Ok(workflows::generate_project_code(&state.router, &project, &options).await)
}

#[tauri::command]
pub fn export_project(
  state: State<'_, AppState>,
  project_id: String,
  files: Option<FileStructure>,
  options: ExportOptions,
) -> Result<ExportOutcome, String> {
  let project = lock(&state.projects)?
    .get(&project_id)
    .cloned()
    .ok_or_else(|| format!("project not found: {project_id}"))?;
  let files = files.unwrap_or_else(|| workflows::generate_project_files(&project, &CodeGenerationOptions::default()));
  workflows::export_project(&project, &files, &options, &state.exports_dir()).map_err(|e| e.to_string())
}

// Editor files

#[tauri::command]
pub fn list_files(state: State<'_, AppState>) -> Result<Vec<CodeFile>, String> {
  Ok(lock(&state.files)?.files().to_vec())
}

#[tauri::command]
pub fn create_file(
  state: State<'_, AppState>,
  name: String,
  content: Option<String>,
  language: Option<String>,
  parent_id: Option<String>,
) -> Result<CodeFile, String> {
  lock(&state.files)?
    .create_file(
      &name,
      content.as_deref().unwrap_or(""),
      language.as_deref().unwrap_or("typescript"),
      parent_id.as_deref(),
    )
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_file_content(state: State<'_, AppState>, file_id: String, content: String) -> Result<(), String> {
  lock(&state.files)?.update_content(&file_id, &content).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn save_file(state: State<'_, AppState>, file_id: String) -> Result<(), String> {
  lock(&state.files)?.save_file(&file_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_file(state: State<'_, AppState>, file_id: String) -> Result<(), String> {
  lock(&state.files)?.delete_file(&file_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_active_file(state: State<'_, AppState>, file_id: String) -> Result<(), String> {
  lock(&state.files)?.set_active(&file_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn active_file(state: State<'_, AppState>) -> Result<Option<CodeFile>, String> {
  Ok(lock(&state.files)?.active_file().cloned())
}

#[tauri::command]
pub fn toggle_folder(state: State<'_, AppState>, folder_id: String) -> Result<bool, String> {
  lock(&state.files)?.toggle_folder(&folder_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn file_tree(state: State<'_, AppState>) -> Result<Vec<FileTreeNode>, String> {
  Ok(lock(&state.files)?.tree())
}

// Search

#[tauri::command]
pub fn search_items(state: State<'_, AppState>, query: String) -> Result<Vec<SearchableItem>, String> {
  Ok(lock(&state.search)?.search(&query))
}

#[tauri::command]
pub fn add_search_items(state: State<'_, AppState>, items: Vec<SearchableItem>) -> Result<(), String> {
  lock(&state.search)?.update_search_data(items);
  Ok(())
}

#[tauri::command]
pub fn items_by_category(state: State<'_, AppState>, category: String) -> Result<Vec<SearchableItem>, String> {
  Ok(lock(&state.search)?.items_by_category(&category))
}

#[tauri::command]
pub fn items_by_type(state: State<'_, AppState>, kind: SearchItemType) -> Result<Vec<SearchableItem>, String> {
  Ok(lock(&state.search)?.items_by_type(kind))
}

// Settings

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<Vec<SettingsKV>, String> {
  let projects = lock(&state.projects)?;
  let conn = projects.db().ok_or("database unavailable")?;
  db::get_settings(conn).map_err(|e| e.to_string())
}

/// Stored values are read at startup; the router keeps its current responders until restart.
#[tauri::command]
pub fn set_setting(state: State<'_, AppState>, key: String, value: String) -> Result<(), String> {
  let projects = lock(&state.projects)?;
  let conn = projects.db().ok_or("database unavailable")?;
  db::set_setting(conn, &key, &value).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_settings(state: State<'_, AppState>, pairs: Vec<SettingInput>) -> Result<(), String> {
  let mut projects = lock(&state.projects)?;
  let conn = projects.db_mut().ok_or("database unavailable")?;
  db::set_settings(conn, &pairs).map_err(|e| e.to_string())
}
