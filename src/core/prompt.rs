//! Prompt engine: single-choice questions with a non-interactive fallback.
//!
//! The terminal side lives behind [`Prompter`]; the engine only decides when
//! to ask and how to map the answer back to an option.

use super::types::PromptOption;
use crate::error::{AutomateError, Result};
use inquire::InquireError;

/// Interactive input collaborator.
pub trait Prompter {
    /// Ask `question` and return the chosen index, or `None` if the user cancelled.
    fn select(&self, question: &str, choices: &[&str], default: usize) -> Result<Option<usize>>;
}

/// Terminal prompter built on `inquire`. Ctrl+C / Esc count as cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&self, question: &str, choices: &[&str], default: usize) -> Result<Option<usize>> {
        let answer = inquire::Select::new(question, choices.to_vec())
            .with_starting_cursor(default)
            .raw_prompt();
        match answer {
            Ok(choice) => Ok(Some(choice.index)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(AutomateError::Prompt(e.to_string())),
        }
    }
}

/// Pick one of `options`.
///
/// Non-interactive runs return the option named `default_name` without
/// touching the prompter. Cancellation becomes [`AutomateError::UserCancelled`].
pub fn ask<'a>(
    prompter: &dyn Prompter,
    interactive: bool,
    question: &str,
    options: &'a [PromptOption],
    default_name: &str,
) -> Result<&'a PromptOption> {
    let default = options
        .iter()
        .position(|o| o.name == default_name)
        .ok_or_else(|| AutomateError::Definition {
            id: question.to_string(),
            errors: vec![format!("default '{}' is not one of the options", default_name)],
        })?;

    if !interactive {
        tracing::debug!(question, answer = default_name, "non-interactive, using default");
        return Ok(&options[default]);
    }

    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    match prompter.select(question, &names, default)? {
        Some(index) => options.get(index).ok_or_else(|| {
            AutomateError::Prompt(format!("selection {} out of range for '{}'", index, question))
        }),
        None => Err(AutomateError::UserCancelled),
    }
}

/// Pick one plain string from `choices` (used by the command layer for
/// tag and preset pickers).
pub fn choose<'a>(
    prompter: &dyn Prompter,
    question: &str,
    choices: &'a [String],
) -> Result<&'a str> {
    let names: Vec<&str> = choices.iter().map(String::as_str).collect();
    match prompter.select(question, &names, 0)? {
        Some(index) => choices
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| AutomateError::Prompt(format!("selection {} out of range", index))),
        None => Err(AutomateError::UserCancelled),
    }
}
