//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use super::signals::{CancellationToken, with_cancellation};
use crate::config::PlannerConfig;
use crate::generator::{TextGenerator, create_generator};
use crate::planner::{
    InputSource, PlannerError, PlannerWorkflow, QuickForm, QuickPlanner, ScriptedInput,
    StdinInput, apply_follow_up,
};
use crate::template::{PromptKind, PromptSet};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Exit code for a session ended by Ctrl-C or end of input
pub const EXIT_INTERRUPTED: i32 = 130;

const INTERRUPTED_MESSAGE: &str =
    "\n\n🚫 Planning interrupted. Come back anytime for your chaotic adventure!";

/// Settings shared by the generating commands
pub struct SessionOptions<'a> {
    pub backend: Option<&'a str>,
    pub max_refinements: Option<u32>,
    pub cancel: CancellationToken,
}

/// Run the full conversational planner
///
/// Answers come from the terminal, or one per line from `answers` when given.
pub async fn plan(
    config: &PlannerConfig,
    options: SessionOptions<'_>,
    answers: Option<&Path>,
    handler: Arc<dyn OutputHandler>,
) -> Result<i32> {
    let generator = build_generator(config, options.backend)?;
    let prompts = build_prompts(config)?;

    let mut input: Box<dyn InputSource> = match answers {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read answers from {}", path.display()))?;
            Box::new(ScriptedInput::new(text.lines()))
        }
        None => Box::new(StdinInput::new()),
    };

    let mut workflow = PlannerWorkflow::new(generator, prompts, handler.clone())
        .with_max_refinements(refinement_cap(
            config.defaults.max_refinements,
            options.max_refinements,
        ))
        .with_cancellation(options.cancel);
    if let Some(lines) = config.defaults.preview_lines {
        workflow = workflow.with_preview_lines(lines);
    }

    match workflow.run(input.as_mut()).await {
        Ok(outcome) => {
            handler.result(true, Some(&outcome.summary));
            handler.state(&outcome.state);
            Ok(0)
        }
        Err(e) => Ok(report_failure(&e, handler.as_ref())),
    }
}

/// Generate itineraries from quick forms
///
/// With `form` given, plans once. Otherwise asks for city and interests
/// repeatedly until a blank city, then prints the session history.
pub async fn quick(
    config: &PlannerConfig,
    options: SessionOptions<'_>,
    form: Option<QuickForm>,
    follow_up: bool,
    handler: Arc<dyn OutputHandler>,
) -> Result<i32> {
    let generator = build_generator(config, options.backend)?;
    let prompts = build_prompts(config)?;
    let cancel = options.cancel;
    let mut planner = QuickPlanner::new(generator, prompts).with_cancellation(cancel.clone());

    let single = form.is_some();
    let mut input = StdinInput::new();
    let mut next_form = form;
    let mut planned = 0;

    loop {
        let form = match next_form.take() {
            Some(form) => form,
            None if single => break,
            None => match with_cancellation(&cancel, read_form(&mut input)).await {
                Some(Ok(Some(form))) => form,
                Some(Ok(None)) => break,
                Some(Err(e)) => return Ok(report_failure(&e, handler.as_ref())),
                None => return Ok(report_failure(&PlannerError::Interrupted, handler.as_ref())),
            },
        };

        let plan = match planner.plan(&form).await {
            Ok(plan) => plan,
            Err(e) => return Ok(report_failure(&e, handler.as_ref())),
        };
        planned += 1;

        let mut output = if follow_up {
            apply_follow_up(&plan.suggestion, &plan.result, &plan.city)
        } else {
            plan.result.clone()
        };
        for (title, text) in plan.sections() {
            output.push_str(&format!("\n\n## {title}\n\n{text}"));
        }
        handler.result(true, Some(&output));
        if !follow_up {
            handler.emit(OutputEvent::Info {
                message: format!("\n💡 Try next: {}", plan.suggestion),
            });
        }
    }

    if planned > 1 {
        handler.emit(OutputEvent::Info {
            message: format!("\n🕓 Session History\n\n{}", planner.history_markdown()),
        });
    }
    Ok(0)
}

async fn read_form(input: &mut dyn InputSource) -> Result<Option<QuickForm>, PlannerError> {
    let city = match input.read_line("🌍 City (blank to finish):").await? {
        Some(city) if !city.trim().is_empty() => city,
        _ => return Ok(None),
    };
    let interests = input
        .read_line("🎯 Interests (comma-separated):")
        .await?
        .ok_or(PlannerError::Interrupted)?;
    Ok(Some(QuickForm::new(city.trim(), interests)))
}

/// Show a session failure and pick the exit code
fn report_failure(error: &PlannerError, handler: &dyn OutputHandler) -> i32 {
    if error.is_interrupted() {
        tracing::info!("session interrupted");
        handler.emit(OutputEvent::Info {
            message: INTERRUPTED_MESSAGE.into(),
        });
        return EXIT_INTERRUPTED;
    }

    tracing::error!(error = %error, "session failed");
    handler.emit(OutputEvent::SessionError {
        error: error.to_string(),
    });
    handler.result(false, None);
    1
}

/// Check backend availability
pub async fn doctor(config: &PlannerConfig, handler: &dyn OutputHandler) -> i32 {
    handler.emit(OutputEvent::Info {
        message: "Checking backends...".into(),
    });

    let default = config.resolve_backend(None).map(|(name, _)| name).ok();
    let mut default_ok = false;

    for (name, backend) in config.enabled_backends() {
        let marker = if default.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        let kind = if backend.is_http() { "http" } else { "cli" };

        let problem = if backend.is_http()
            && backend.api_key_env.is_some()
            && backend.api_key().is_none()
        {
            backend
                .api_key_env
                .as_ref()
                .map(|var| format!("{} not set", var))
        } else {
            match create_generator(&name, &backend) {
                Ok(generator) if generator.is_available().await => None,
                Ok(_) => Some("not reachable".to_string()),
                Err(e) => Some(e.to_string()),
            }
        };

        let message = match problem {
            None => {
                if !marker.is_empty() {
                    default_ok = true;
                }
                format!("✓ {}{} ({}: {})", name, marker, kind, backend.command)
            }
            Some(problem) => format!(
                "✗ {}{} ({}: {} - {})",
                name, marker, kind, backend.command, problem
            ),
        };
        handler.emit(OutputEvent::Info { message });
    }

    if default.is_none() {
        handler.emit(OutputEvent::Info {
            message: "✗ default backend is not configured".into(),
        });
    }

    if default_ok { 0 } else { 1 }
}

/// Validate the prompt templates, including configured overrides
pub fn validate(config: &PlannerConfig, handler: &dyn OutputHandler) -> i32 {
    match PromptSet::with_overrides(&config.prompts) {
        Ok(_) => {
            for kind in PromptKind::ALL {
                let source = if config.prompts.contains_key(kind.as_str()) {
                    "override"
                } else {
                    "built-in"
                };
                handler.emit(OutputEvent::Info {
                    message: format!(
                        "✓ {} ({}; placeholders: {})",
                        kind,
                        source,
                        kind.placeholders().join(", ")
                    ),
                });
            }
            handler.emit(OutputEvent::Info {
                message: format!("All {} prompt templates are valid", PromptKind::ALL.len()),
            });
            0
        }
        Err(e) => {
            handler.emit(OutputEvent::Info {
                message: format!("✗ Prompt validation failed: {}", e),
            });
            1
        }
    }
}

fn build_generator(config: &PlannerConfig, backend: Option<&str>) -> Result<Arc<dyn TextGenerator>> {
    let (name, backend) = config.resolve_backend(backend)?;
    tracing::debug!(backend = %name, command = %backend.command, "using backend");
    create_generator(&name, &backend).with_context(|| format!("failed to set up backend '{}'", name))
}

fn build_prompts(config: &PlannerConfig) -> Result<PromptSet> {
    PromptSet::with_overrides(&config.prompts).context("invalid prompt configuration")
}

/// Effective refinement cap; 0 from either source means unbounded
pub fn refinement_cap(configured: Option<u32>, cli: Option<u32>) -> Option<u32> {
    cli.or(configured).filter(|&cap| cap > 0)
}
