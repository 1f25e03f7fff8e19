//! Interactive shell
//!
//! Sessions live in the process, so the shell dispatches its commands
//! in-process against one shared [`crate::context::TenantContext`].

mod completer;
mod executor;
mod prompt;

pub use completer::Completer;
pub use executor::{CommandExecutor, ExecuteResult, ShellCommand};
pub use prompt::Prompt;
