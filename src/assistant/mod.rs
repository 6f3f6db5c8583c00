pub mod classify;
pub mod session;

pub use classify::{classify_intent, Intent};
pub use session::{AiModel, AssistantSession, ChatRequest, PendingTurn, AVAILABLE_MODELS};
