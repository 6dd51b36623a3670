//! Configuration loading with multi-layer merge

use super::backend::DEFAULT_BACKEND;
use super::{BackendConfig, PromptOverride};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level trip planner configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Global defaults
    #[serde(default)]
    pub defaults: Defaults,

    /// Backend definitions
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,

    /// Prompt overrides, keyed by prompt name
    #[serde(default)]
    pub prompts: HashMap<String, PromptOverride>,
}

/// Global default settings
///
/// Unset fields fall through to earlier layers, then to the planner's own
/// defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Backend used for generation
    pub backend: Option<String>,

    /// Refinement rounds allowed per session (unset or 0 = unbounded)
    pub max_refinements: Option<u32>,

    /// Recommendations shown while planning
    pub preview_lines: Option<usize>,
}

impl PlannerConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/trip-planner/config.toml
    /// 3. .trip-planner/config.toml (current directory)
    /// 4. explicit `--config` path
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                config.merge(Self::load_file(&user_config_path)?);
            }
        }

        let project_config_path = PathBuf::from(".trip-planner/config.toml");
        if project_config_path.exists() {
            config.merge(Self::load_file(&project_config_path)?);
        }

        if let Some(path) = explicit {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            config.merge(Self::load_file(Path::new(&expanded))?);
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config layer");
        Ok(config)
    }

    /// Get the user config path (~/.config/trip-planner/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trip-planner/config.toml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.defaults.backend.is_some() {
            self.defaults.backend = other.defaults.backend;
        }
        if other.defaults.max_refinements.is_some() {
            self.defaults.max_refinements = other.defaults.max_refinements;
        }
        if other.defaults.preview_lines.is_some() {
            self.defaults.preview_lines = other.defaults.preview_lines;
        }

        self.backends.extend(other.backends);

        // Field-level merge so a layer can override only the human text
        for (name, prompt) in other.prompts {
            let entry = self.prompts.entry(name).or_default();
            if prompt.system.is_some() {
                entry.system = prompt.system;
            }
            if prompt.human.is_some() {
                entry.human = prompt.human;
            }
        }
    }

    /// Resolve the backend to generate with
    ///
    /// `requested` (from the command line) wins over `defaults.backend`.
    /// The built-in Groq backend is used when nothing names a configured one.
    pub fn resolve_backend(&self, requested: Option<&str>) -> Result<(String, BackendConfig)> {
        let name = requested
            .map(str::to_string)
            .or_else(|| self.defaults.backend.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string());

        match self.backends.get(&name) {
            Some(backend) => Ok((name, backend.clone())),
            None if name == DEFAULT_BACKEND => Ok((name, BackendConfig::groq())),
            None => {
                let mut known: Vec<&str> = self.backends.keys().map(String::as_str).collect();
                known.sort_unstable();
                anyhow::bail!(
                    "backend '{}' is not configured (known: {})",
                    name,
                    if known.is_empty() {
                        DEFAULT_BACKEND.to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }

    /// Get all enabled backends, including the built-in default
    pub fn enabled_backends(&self) -> Vec<(String, BackendConfig)> {
        let mut backends: Vec<(String, BackendConfig)> = self
            .backends
            .iter()
            .filter(|(_, b)| b.enabled)
            .map(|(n, b)| (n.clone(), b.clone()))
            .collect();
        if !self.backends.contains_key(DEFAULT_BACKEND) {
            backends.push((DEFAULT_BACKEND.to_string(), BackendConfig::groq()));
        }
        backends.sort_by(|a, b| a.0.cmp(&b.0));
        backends
    }
}
