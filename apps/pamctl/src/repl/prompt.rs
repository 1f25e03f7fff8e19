//! Prompt showing the default session

use crate::session::SessionRegistry;
use std::io::IsTerminal;

/// Prompt generator for the interactive shell
pub struct Prompt;

impl Prompt {
    /// `pamctl [host]> ` or `pamctl (not connected)> `
    pub fn generate(registry: &SessionRegistry) -> String {
        match registry.default_host() {
            Some(host) => format!("pamctl [{host}]> "),
            None => "pamctl (not connected)> ".to_string(),
        }
    }

    pub fn generate_colored(registry: &SessionRegistry) -> String {
        match registry.default_host() {
            Some(host) => format!("\x1b[32mpamctl\x1b[0m [\x1b[36m{host}\x1b[0m]> "),
            None => "\x1b[32mpamctl\x1b[0m \x1b[33m(not connected)\x1b[0m> ".to_string(),
        }
    }

    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal()
    }

    pub fn generate_auto(registry: &SessionRegistry) -> String {
        if Self::supports_color() {
            Self::generate_colored(registry)
        } else {
            Self::generate(registry)
        }
    }
}
