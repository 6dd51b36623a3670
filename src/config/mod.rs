//! Configuration types and loading for the trip planner

mod backend;
mod loader;
mod prompts;

pub use backend::BackendConfig;
pub use loader::PlannerConfig;
pub use prompts::PromptOverride;
