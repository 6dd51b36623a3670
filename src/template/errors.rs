//! Template error types with suggestions

use thiserror::Error;

/// Prompt template errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholder has no value
    #[error("undefined placeholder '{name}' in template '{template}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UndefinedVariable {
        name: String,
        template: String,
        suggestion: Option<String>,
    },

    /// Template syntax error
    #[error("syntax error in template '{template}' at line {line}: {message}")]
    SyntaxError {
        template: String,
        message: String,
        line: usize,
    },

    /// Template name not known
    #[error("unknown template '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UnknownTemplate {
        name: String,
        suggestion: Option<String>,
    },

    /// Wrapped minijinja error
    #[error("template error: {0}")]
    Internal(#[from] minijinja::Error),
}

impl TemplateError {
    /// Create an undefined placeholder error with optional suggestion
    pub fn undefined_variable(
        name: impl Into<String>,
        template: impl Into<String>,
        known: &[&str],
    ) -> Self {
        let name = name.into();
        let suggestion = suggest_correction(&name, known);
        Self::UndefinedVariable {
            name,
            template: template.into(),
            suggestion,
        }
    }

    pub fn syntax(template: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self::SyntaxError {
            template: template.into(),
            message: message.into(),
            line,
        }
    }

    pub fn unknown_template(name: impl Into<String>, known: &[&str]) -> Self {
        let name = name.into();
        let suggestion = suggest_correction(&name, known);
        Self::UnknownTemplate { name, suggestion }
    }
}

/// Suggest a correction for a typo using Levenshtein distance
pub fn suggest_correction(typo: &str, candidates: &[&str]) -> Option<String> {
    let max_distance = (typo.len() / 2).max(2);

    candidates
        .iter()
        .map(|candidate| (levenshtein_distance(typo, candidate), *candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}

/// Edit distance between two strings, single-row variant
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != *cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b_chars.len()]
}
