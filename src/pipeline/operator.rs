// ABOUTME: Line-oriented operator prompts behind a trait.
// ABOUTME: The orchestrator never touches stdin directly, so tests inject answers.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Operator I/O: line-oriented prompts for credentials, identifiers, and
/// yes/no branch decisions. No other protocol.
pub trait Operator {
    /// Prompt for a non-empty line. Empty input is `InvalidInput`.
    fn prompt_line(&mut self, prompt: &str) -> Result<String>;

    /// Prompt for a yes/no answer. Anything but y/yes/n/no is `InvalidInput`.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reads answers from stdin, writes prompts to stdout.
#[derive(Debug, Default)]
pub struct StdOperator;

impl StdOperator {
    fn read_line(&self, prompt: &str) -> Result<String> {
        print!("{prompt}: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Operator for StdOperator {
    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        let line = self.read_line(prompt)?;
        if line.is_empty() {
            return Err(Error::InvalidInput(format!("{prompt}: empty value")));
        }
        Ok(line)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let line = self.read_line(&format!("{prompt} [y/n]"))?;
        parse_yes_no(&line).ok_or_else(|| {
            Error::InvalidInput(format!("{prompt}: expected y or n, got '{line}'"))
        })
    }
}

pub(crate) fn parse_yes_no(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Replays scripted answers in order. For non-interactive callers and tests.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: std::collections::VecDeque<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| Error::InvalidInput(format!("{prompt}: no answer scripted")))
    }
}

impl Operator for ScriptedOperator {
    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        let line = self.next(prompt)?;
        if line.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{prompt}: empty value")));
        }
        Ok(line.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let line = self.next(prompt)?;
        parse_yes_no(line.trim()).ok_or_else(|| {
            Error::InvalidInput(format!("{prompt}: expected y or n, got '{line}'"))
        })
    }
}
