pub mod demo;
pub mod prompts;
pub mod router;
pub mod task;

pub use prompts::ProjectSpec;
pub use router::{analysis_task, project_task, select_route, Responder, Responders, Route, TaskRouter};
pub use task::{score_complexity, AiResponse, AiTask, ResponseOrigin, TaskKind};
