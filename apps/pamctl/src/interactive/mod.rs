//! Interactive console collaborator.
//!
//! The login flow talks to the user only through [`Console`], so it can be
//! driven from a terminal, a script, or a test double.

pub mod prompts;

pub use prompts::{is_interactive_terminal, TerminalConsole};

use crate::error::CliResult;

/// Prompts and notifications used during authentication
pub trait Console: Send + Sync {
    /// Ask for free text; `None` when the user enters nothing
    fn prompt_text(&self, prompt: &str) -> CliResult<Option<String>>;

    /// Ask for a secret without echoing it
    fn prompt_secret(&self, prompt: &str) -> CliResult<String>;

    /// Present numbered options and return the raw reply, `None` when empty
    fn choose(&self, prompt: &str, options: &[String]) -> CliResult<Option<String>>;

    /// Progress or instruction text
    fn notify(&self, message: &str);
}
