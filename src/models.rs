use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ID = String;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
  Web,
  Mobile,
  Api,
  Desktop,
}

impl ProjectType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProjectType::Web => "web",
      ProjectType::Mobile => "mobile",
      ProjectType::Api => "api",
      ProjectType::Desktop => "desktop",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "web" => Some(ProjectType::Web),
      "mobile" => Some(ProjectType::Mobile),
      "api" => Some(ProjectType::Api),
      "desktop" => Some(ProjectType::Desktop),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
  Active,
  Archived,
  InDevelopment,
}

impl ProjectStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProjectStatus::Active => "active",
      ProjectStatus::Archived => "archived",
      ProjectStatus::InDevelopment => "in_development",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "active" => Some(ProjectStatus::Active),
      "archived" => Some(ProjectStatus::Archived),
      "in_development" => Some(ProjectStatus::InDevelopment),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
  pub id: ID,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: ProjectType,
  pub tech_stack: Vec<String>,
  pub created_at: String,
  pub updated_at: String,
  pub owner_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub git_url: Option<String>,
  pub status: ProjectStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

/// Partial update applied by `ProjectStore::update`; `None` fields are left alone.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ProjectPatch {
  pub name: Option<String>,
  #[serde(rename = "type")]
  pub kind: Option<ProjectType>,
  pub tech_stack: Option<Vec<String>>,
  pub git_url: Option<String>,
  pub status: Option<ProjectStatus>,
  pub description: Option<String>,
  pub version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CodeFile {
  pub id: ID,
  pub name: String,
  pub content: String,
  pub language: String,
  pub modified: bool,
  pub path: String,
  #[serde(default)]
  pub is_folder: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_id: Option<ID>,
  #[serde(default)]
  pub expanded: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FileTreeNode {
  pub id: ID,
  pub name: String,
  #[serde(rename = "type")]
  pub node_type: String, // file|folder
  pub path: String,
  pub parent_id: Option<ID>,
  pub expanded: bool,
  pub children: Vec<FileTreeNode>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  User,
  Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MessageMetadata {
  pub tokens_used: Option<u64>,
  pub processing_time_ms: Option<u64>,
  pub complexity: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
  pub id: ID,
  pub content: String,
  pub role: ChatRole,
  pub timestamp: String,
  pub model: Option<String>,
  pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettingsKV {
  pub key: String,
  pub value: String,
  pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingInput {
  pub key: String,
  pub value: String,
}

pub fn new_id() -> ID {
  Uuid::new_v4().to_string()
}

pub fn now_iso() -> String {
  // RFC3339-ish without nanos; good enough for sorting/display.
  let t = time::OffsetDateTime::now_utc();
  t.format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
