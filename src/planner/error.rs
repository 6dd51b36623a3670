//! Planner error types

use super::stage::{InputField, Stage};
use crate::generator::GeneratorError;
use crate::template::TemplateError;
use thiserror::Error;

/// Errors that end a planning session
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A required answer was blank
    #[error("missing required input: {field}")]
    MissingInput { field: InputField },

    /// The generator failed during a stage
    #[error("stage '{stage}' failed: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GeneratorError,
    },

    #[error("prompt error: {0}")]
    Template(#[from] TemplateError),

    /// The traveler cancelled or input ended
    #[error("planning interrupted")]
    Interrupted,

    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

impl PlannerError {
    pub fn missing(field: InputField) -> Self {
        Self::MissingInput { field }
    }

    pub fn generation(stage: Stage, source: GeneratorError) -> Self {
        Self::Generation { stage, source }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, PlannerError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::missing(InputField::Interests);
        assert_eq!(err.to_string(), "missing required input: interests");

        let err = PlannerError::generation(
            Stage::GenerateLocalTips,
            GeneratorError::network("connection reset"),
        );
        let msg = err.to_string();
        assert!(msg.contains("generate_local_tips"));
        assert!(msg.contains("connection reset"));

        assert!(PlannerError::Interrupted.is_interrupted());
        assert!(!err.is_interrupted());
    }
}
