//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{InstallerError, Result};

use super::theme::StatusTag;
use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Environment variable prefix for answering prompts without a terminal.
pub const PROMPT_ENV_PREFIX: &str = "PERIPHERY_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `PERIPHERY_PROMPT_<KEY>` variables, then from
/// the prompt's default; a prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("{} {}", StatusTag::Ok.label(), msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{} {}", StatusTag::Warn.label(), msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{} {}", StatusTag::Error.label(), msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
            .cloned();

        match (answer, &prompt.prompt_type) {
            (Some(value), PromptType::Confirm) => {
                let parsed = PromptResult::String(value).as_bool().unwrap_or(false);
                Ok(PromptResult::Bool(parsed))
            }
            (Some(value), _) => Ok(PromptResult::String(value)),
            (None, _) => Err(InstallerError::PromptUnavailable {
                key: prompt.key.clone(),
                message: "running non-interactively and the prompt has no default".to_string(),
            }),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_progress() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner)
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_progress() {
            println!("\n== {} ==\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_progress() {
            println!("  {}", hint);
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str) {
        eprintln!("    Command: {}", command);
        for line in output.lines() {
            eprintln!("    | {}", line);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final status line.
struct NoopSpinner;

impl SpinnerHandle for NoopSpinner {
    fn finish_success(&mut self, msg: &str) {
        println!("{} {}", StatusTag::Ok.label(), msg);
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{} {}", StatusTag::Error.label(), msg);
    }
}
