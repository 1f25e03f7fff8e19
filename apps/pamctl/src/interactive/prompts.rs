//! Terminal implementation of the console collaborator using dialoguer.

use std::io::IsTerminal;

use dialoguer::{Input, Password};

use crate::error::{CliError, CliResult};
use crate::interactive::Console;
use crate::output::print_info;

/// Checks if both stdin and stdout are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Console backed by the process terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }

    /// Fail early when there is no terminal to prompt on
    pub fn require_interactive(&self) -> CliResult<()> {
        if !is_interactive_terminal() {
            return Err(CliError::Validation(
                "Interactive login requires a terminal.".into(),
            ));
        }
        Ok(())
    }
}

impl Console for TerminalConsole {
    fn prompt_text(&self, prompt: &str) -> CliResult<Option<String>> {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CliError::InputError(format!("Failed to read input: {e}")))?;

        let input = input.trim();
        if input.is_empty() {
            Ok(None)
        } else {
            Ok(Some(input.to_string()))
        }
    }

    fn prompt_secret(&self, prompt: &str) -> CliResult<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CliError::InputError(format!("Failed to read secret: {e}")))
    }

    fn choose(&self, prompt: &str, options: &[String]) -> CliResult<Option<String>> {
        println!();
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        self.prompt_text(&format!("{prompt} [1]"))
    }

    fn notify(&self, message: &str) {
        print_info(message);
    }
}
