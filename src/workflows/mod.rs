pub mod export;
pub mod scaffold;

pub use export::{export_project, ExportError, ExportFormat, ExportOptions, ExportOutcome};
pub use scaffold::{generate_project_code, generate_project_files, CodeGenerationOptions, FileNode, FileStructure};
