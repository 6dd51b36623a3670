//! Where human answers come from

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// A source of one-line human answers
#[async_trait]
pub trait InputSource: Send {
    /// Show `prompt` and read one answer; `None` at end of input
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}

/// Terminal input; prompts go to stderr
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        {
            let mut err = std::io::stderr().lock();
            writeln!(err, "{prompt}")?;
            write!(err, "Your Input: ")?;
            err.flush()?;
        }
        self.lines.next_line().await
    }
}

/// Pre-recorded answers, read in order
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&mut self, _prompt: &str) -> std::io::Result<Option<String>> {
        Ok(self.answers.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_input_in_order() {
        let mut input = ScriptedInput::new(["Paris", "art"]);

        assert_eq!(input.read_line("city?").await.unwrap().as_deref(), Some("Paris"));
        assert_eq!(input.read_line("interests?").await.unwrap().as_deref(), Some("art"));
        assert_eq!(input.read_line("budget?").await.unwrap(), None);
        assert_eq!(input.remaining(), 0);
    }
}
