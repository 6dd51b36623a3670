//! Template engine for rendering prompt text

use super::errors::TemplateError;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Placeholder values keyed by name
pub type PromptVars = BTreeMap<String, String>;

/// Template rendering engine
///
/// Wraps minijinja with strict undefined handling so a misspelled
/// placeholder fails loudly instead of rendering as an empty string.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    /// Render template text with the given placeholder values
    ///
    /// `name` only labels errors.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        vars: &PromptVars,
    ) -> Result<String, TemplateError> {
        self.env
            .render_str(source, vars)
            .map_err(|e| convert_minijinja_error(e, name, source, vars))
    }

    /// Check that a template renders against the given placeholder names
    pub fn validate(&self, name: &str, source: &str, placeholders: &[&str]) -> Result<(), TemplateError> {
        let vars: PromptVars = placeholders
            .iter()
            .map(|p| (p.to_string(), format!("<{}>", p)))
            .collect();
        self.render(name, source, &vars).map(|_| ())
    }
}

/// Names referenced as `{{ name ... }}` in a template
pub fn referenced_placeholders(source: &str) -> Vec<String> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)").ok())
        .as_ref()
    else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::new();
    for cap in re.captures_iter(source) {
        let name = cap[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn convert_minijinja_error(
    err: minijinja::Error,
    name: &str,
    source: &str,
    vars: &PromptVars,
) -> TemplateError {
    match err.kind() {
        ErrorKind::UndefinedError => {
            let known: Vec<&str> = vars.keys().map(String::as_str).collect();
            let missing = referenced_placeholders(source)
                .into_iter()
                .find(|p| !vars.contains_key(p))
                .unwrap_or_else(|| "unknown".to_string());
            TemplateError::undefined_variable(missing, name, &known)
        }
        ErrorKind::SyntaxError => {
            let line = err.line().unwrap_or(0);
            let message = err.detail().unwrap_or("invalid syntax").to_string();
            TemplateError::syntax(name, message, line)
        }
        _ => TemplateError::Internal(err),
    }
}
