//! Interactive prompts backed by dialoguer.

use console::Term;
use dialoguer::{Confirm, Input};

use crate::error::{InstallerError, Result};

use super::{Prompt, PromptResult, PromptType};

fn unavailable(prompt: &Prompt, e: dialoguer::Error) -> InstallerError {
    InstallerError::PromptUnavailable {
        key: prompt.key.clone(),
        message: e.to_string(),
    }
}

/// Ask `prompt` on `term`.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match prompt.prompt_type {
        PromptType::Confirm => {
            let default = prompt
                .default
                .clone()
                .and_then(|d| PromptResult::String(d).as_bool())
                .unwrap_or(false);

            Confirm::new()
                .with_prompt(&prompt.question)
                .default(default)
                .interact_on(term)
                .map(PromptResult::Bool)
                .map_err(|e| unavailable(prompt, e))
        }
        PromptType::Input => {
            let mut input = Input::<String>::new()
                .with_prompt(&prompt.question)
                .allow_empty(true);
            if let Some(default) = &prompt.default {
                input = input.default(default.clone());
            }

            let answer = input.interact_on(term).map_err(|e| unavailable(prompt, e))?;
            Ok(PromptResult::String(answer.trim().to_string()))
        }
    }
}
