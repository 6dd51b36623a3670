//! Conversational trip planning
//!
//! A session walks a fixed sequence of stages: nine input questions, five
//! generation stages, then a satisfaction check that either finalizes the
//! plan or loops through a refinement. Stages are pure transitions over
//! [`PlannerState`]; [`PlannerWorkflow`] collects the answers and generated
//! text that feed them.

mod classify;
mod error;
mod input;
mod quick;
mod runner;
mod stage;
mod state;
mod summary;
mod transitions;

pub use error::PlannerError;
pub use input::{InputSource, ScriptedInput, StdinInput};
pub use quick::{QuickForm, QuickPlanner, apply_follow_up};
pub use runner::PlannerWorkflow;
pub use stage::Stage;
pub use state::{DEFAULT_BUDGET, DEFAULT_DURATION, DEFAULT_TRAVEL_STYLE, PlannerState};
