pub mod assistant;
pub mod config;
pub mod db;
pub mod dnd;
pub mod llm;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod search;
pub mod state;
pub mod store;
pub mod workflows;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  logging::init();

  let state = state::AppState::init(config::AppConfig::from_env());

  let result = tauri::Builder::default()
    .plugin(tauri_plugin_dialog::init())
    .manage(state)
    .invoke_handler(tauri::generate_handler![
      commands::db_health,
      // chat
      commands::send_message,
      commands::handle_user_input,
      commands::generate_code,
      commands::analyze_code,
      commands::create_project_with_ai,
      commands::select_model,
      commands::clear_chat,
      commands::chat_history,
      commands::tokens_used,
      commands::list_models,
      // projects
      commands::list_projects,
      commands::create_project,
      commands::get_project,
      commands::load_project,
      commands::current_project,
      commands::update_project,
      commands::delete_project,
      commands::import_project,
      commands::generate_project_code,
      commands::export_project,
      // editor files
      commands::list_files,
      commands::create_file,
      commands::update_file_content,
      commands::save_file,
      commands::delete_file,
      commands::set_active_file,
      commands::active_file,
      commands::toggle_folder,
      commands::file_tree,
      // search
      commands::search_items,
      commands::add_search_items,
      commands::items_by_category,
      commands::items_by_type,
      // settings
      commands::get_settings,
      commands::set_setting,
      commands::set_settings,
    ])
    .run(tauri::generate_context!());

  if let Err(e) = result {
    tracing::error!(error = %e, "FORGE IA exited with an error");
  }
}
