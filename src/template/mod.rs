//! Prompt templating
//!
//! Prompts are Jinja2-style templates rendered with minijinja in strict
//! mode. Each prompt has a fixed placeholder set; user overrides from the
//! config file are checked against it at load time.
//!
//! # Example
//!
//! ```ignore
//! use trip_planner::template::{PromptKind, PromptSet};
//!
//! let prompts = PromptSet::builtin();
//! let mut vars = PromptVars::new();
//! vars.insert("city".into(), "Lisbon".into());
//! let request = prompts.render(PromptKind::LocalTips, vars)?;
//! ```

mod engine;
mod errors;
mod prompts;

pub use engine::PromptVars;
pub use errors::TemplateError;
pub use prompts::{PromptKind, PromptSet};
