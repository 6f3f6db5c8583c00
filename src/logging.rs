//! Tracing setup and the structured log helpers shared by the router and the stores.

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Filter comes from `FORGE_LOG`, then `RUST_LOG`,
/// then defaults to `info`. Calling it twice is harmless.
pub fn init() {
    let filter = std::env::var("FORGE_LOG")
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[derive(Debug, Clone, Copy)]
pub enum LogOperation {
    Routing,
    DemoFallback,
    ProjectStore,
    FileStore,
    Export,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::Routing => "routing",
            LogOperation::DemoFallback => "demo_fallback",
            LogOperation::ProjectStore => "project_store",
            LogOperation::FileStore => "file_store",
            LogOperation::Export => "export",
        }
    }
}

pub fn log_route(task_kind: &str, complexity: u8, responder: &str) {
    tracing::info!(
        operation = LogOperation::Routing.as_str(),
        task_kind,
        complexity,
        responder,
        "Task routed"
    );
}

pub fn log_responder_failure(responder: &str, error: &dyn std::fmt::Display) {
    tracing::error!(
        operation = LogOperation::DemoFallback.as_str(),
        responder,
        error = %error,
        "Responder call failed, answering with demo response"
    );
}

pub fn log_mirror_failure(operation: LogOperation, key: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        operation = operation.as_str(),
        key,
        error = %error,
        "Local storage mirror write failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
        log_route("creative", 8, "Claude");
    }
}
