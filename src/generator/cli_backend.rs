//! CLI-based generator (local model runners such as `ollama run`)

use super::types::{GenerationRequest, GenerationResponse, GeneratorError, TextGenerator};
use crate::config::BackendConfig;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Generator that runs a local command with the prompt as its final argument
#[derive(Debug, Clone)]
pub struct CliBackend {
    name: String,

    /// Command to execute
    command: String,

    /// Default arguments, placed before the prompt
    args: Vec<String>,

    timeout: Duration,

    /// Environment variables to set
    env: Vec<(String, String)>,
}

impl CliBackend {
    /// Create a new CLI backend from config
    pub fn from_config(name: impl Into<String>, config: &BackendConfig) -> Self {
        Self {
            name: name.into(),
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout),
            env: config
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn build_command(&self, request: &GenerationRequest) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd.arg(request.flattened());

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        cmd
    }
}

#[cfg(test)]
impl CliBackend {
    /// Create a new CLI backend with explicit parameters
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(120),
            env: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TextGenerator for CliBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError> {
        let start = Instant::now();
        let timeout = self.timeout;

        tracing::debug!(
            backend = %self.name,
            command = %self.command,
            template = %request.template,
            "spawning generator command"
        );

        let mut child = self
            .build_command(request)
            .spawn()
            .map_err(|e| GeneratorError::Unavailable {
                message: format!("failed to spawn '{}': {}", self.command, e),
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| GeneratorError::parse("stdout not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GeneratorError::parse("stderr not captured"))?;

        let result = tokio::time::timeout(timeout, async {
            let mut out = String::new();
            let mut err = String::new();
            let (out_res, err_res) =
                tokio::join!(stdout.read_to_string(&mut out), stderr.read_to_string(&mut err));
            out_res.map_err(|e| GeneratorError::parse(format!("stdout read error: {}", e)))?;
            err_res.map_err(|e| GeneratorError::parse(format!("stderr read error: {}", e)))?;

            let status = child.wait().await.map_err(|e| GeneratorError::Unavailable {
                message: format!("failed to wait for process: {}", e),
            })?;
            Ok::<_, GeneratorError>((status, out, err))
        })
        .await;

        let elapsed = start.elapsed();

        match result {
            Ok(Ok((status, out, err))) => {
                if !status.success() {
                    return Err(GeneratorError::ExecutionFailed {
                        exit_code: status.code(),
                        stderr: err,
                    });
                }
                let text = out.trim().to_string();
                if text.is_empty() {
                    return Err(GeneratorError::empty(self.name.clone()));
                }
                Ok(GenerationResponse::new(text, self.name.clone(), elapsed))
            }
            Ok(Err(e)) => Err(e),
            // Child is killed on drop
            Err(_) => Err(GeneratorError::timeout(elapsed)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        Command::new("which")
            .arg(&self.command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
