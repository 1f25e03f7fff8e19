//! Tab completion for shell commands and connected hosts

use crate::session::SessionRegistry;
use rustyline::completion::{Candidate, Completer as RustylineCompleter};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// Commands whose next word is a host
const HOST_COMMANDS: &[&str] = &["use", "disconnect"];

/// Completion candidate
#[derive(Debug)]
pub struct CompletionCandidate {
    display: String,
    replacement: String,
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl CompletionCandidate {
    fn new(value: &str) -> Self {
        Self {
            display: value.to_string(),
            replacement: value.to_string(),
        }
    }
}

/// Completes the command word, then registered hosts where a host is expected
pub struct Completer {
    commands: Vec<String>,
    registry: Arc<SessionRegistry>,
}

impl Completer {
    pub fn new(commands: Vec<String>, registry: Arc<SessionRegistry>) -> Self {
        Self { commands, registry }
    }

    fn get_completions(&self, line: &str, pos: usize) -> Vec<CompletionCandidate> {
        let line = &line[..pos];
        let parts: Vec<&str> = line.split_whitespace().collect();
        let prefix = if line.ends_with(' ') {
            ""
        } else {
            parts.last().copied().unwrap_or_default()
        };
        let completed_words = if prefix.is_empty() {
            parts.len()
        } else {
            parts.len() - 1
        };

        let options: Vec<String> = if completed_words == 0 {
            self.commands.clone()
        } else if expects_host(&parts[..completed_words]) {
            self.registry.hosts()
        } else {
            Vec::new()
        };

        options
            .iter()
            .filter(|option| option.starts_with(prefix))
            .map(|option| CompletionCandidate::new(option))
            .collect()
    }
}

fn expects_host(words: &[&str]) -> bool {
    match words {
        [command] => HOST_COMMANDS.contains(command),
        [.., flag] => *flag == "--host",
        [] => false,
    }
}

impl RustylineCompleter for Completer {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>)> {
        let candidates = self.get_completions(line, pos);
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        Ok((start, candidates))
    }
}

impl Hinter for Completer {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for Completer {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Borrowed(prompt)
    }
}

impl Validator for Completer {}

impl Helper for Completer {}
