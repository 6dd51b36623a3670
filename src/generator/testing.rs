//! Deterministic generator for tests

use super::types::{GenerationRequest, GenerationResponse, GeneratorError, TextGenerator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Records every request and answers from per-template scripts
///
/// Without a script for a template it replies
/// `"<template> #<n>"` where `n` counts calls for that template.
#[derive(Default)]
pub struct ScriptedGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
    failures: Mutex<HashMap<String, GeneratorError>>,
    replies: Mutex<HashMap<String, String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `text` for the named template
    pub fn reply(self, template: &str, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(template.to_string(), text.to_string());
        self
    }

    /// Fail every request for the named template
    pub fn fail(self, template: &str, error: GeneratorError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(template.to_string(), error);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, template: &str) -> Vec<GenerationRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.template == template)
            .collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests
                .iter()
                .filter(|r| r.template == request.template)
                .count()
        };

        if let Some(error) = self.failures.lock().unwrap().get(&request.template) {
            return Err(error.clone());
        }

        let text = self
            .replies
            .lock()
            .unwrap()
            .get(&request.template)
            .cloned()
            .unwrap_or_else(|| format!("{} #{}", request.template, count));

        Ok(GenerationResponse::new(
            text,
            "scripted".into(),
            Duration::from_millis(1),
        ))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
