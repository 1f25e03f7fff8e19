//! Command execution for the interactive shell

use crate::auth::Connected;
use crate::context::TenantContext;
use crate::error::{CliError, CliResult};
use crate::extensions::{ExtensionCatalog, ExtensionKind, ExtensionScript, ExtensionSource};
use crate::federation::SamlBrowser;
use crate::interactive::Console;
use crate::logging::redaction::truncate;
use crate::models::CredentialSpec;
use crate::output::{print_info, print_key_value, print_success, print_warning};

/// Longest raw response shown by `last-error`
const RAW_RESPONSE_PREVIEW: usize = 400;

/// Operations compiled into the shell: name, usage, summary
const BUILTIN_OPERATIONS: &[(&str, &str, &str)] = &[
    ("connect", "connect <host> [--user <name>]", "Authenticate to a tenant"),
    (
        "invoke",
        "invoke <call> [<json>] [--host <host>]",
        "POST a JSON payload to an API call",
    ),
    ("use", "use <host>", "Make a connected host the default"),
    ("sessions", "sessions", "List connected hosts"),
    ("disconnect", "disconnect [<host>]", "Forget a session"),
    ("last-error", "last-error", "Show the most recent API failure"),
];

/// Lists the compiled operations as functions
pub struct BuiltinOperations;

impl ExtensionSource for BuiltinOperations {
    fn describe(&self) -> String {
        "builtin".to_string()
    }

    fn list(&self) -> CliResult<Vec<ExtensionScript>> {
        Ok(BUILTIN_OPERATIONS
            .iter()
            .map(|(name, usage, about)| ExtensionScript {
                name: name.to_string(),
                kind: ExtensionKind::Function,
                source_locator: format!("builtin:{usage}"),
                content: about.to_string(),
            })
            .collect())
    }
}

/// Result of executing a command in the shell
#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Command executed, continue REPL
    Continue,
    /// User requested exit
    Exit,
    /// Empty input, just show new prompt
    Empty,
}

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Connect {
        host: String,
        user: Option<String>,
    },
    Invoke {
        call: String,
        payload: Option<String>,
        host: Option<String>,
    },
    Use {
        host: String,
    },
    Sessions,
    Disconnect {
        host: Option<String>,
    },
    LastError,
    Help {
        topic: Option<String>,
    },
    Exit,
}

impl ShellCommand {
    /// Parse a line; `None` for blank input
    pub fn parse(line: &str) -> CliResult<Option<Self>> {
        let args = parse_args(line)?;
        let Some((name, rest)) = args.split_first() else {
            return Ok(None);
        };
        let (positional, flags) = split_flags(rest)?;
        let flag = |key: &str| {
            flags
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let command = match name.to_lowercase().as_str() {
            "exit" | "quit" | "q" => ShellCommand::Exit,
            "help" | "?" => ShellCommand::Help {
                topic: positional.first().cloned(),
            },
            "connect" => ShellCommand::Connect {
                host: required(&positional, 0, "connect <host>")?,
                user: flag("user"),
            },
            "invoke" => ShellCommand::Invoke {
                call: required(&positional, 0, "invoke <call>")?,
                payload: positional.get(1).cloned(),
                host: flag("host"),
            },
            "use" => ShellCommand::Use {
                host: required(&positional, 0, "use <host>")?,
            },
            "sessions" => ShellCommand::Sessions,
            "disconnect" => ShellCommand::Disconnect {
                host: positional.first().cloned(),
            },
            "last-error" => ShellCommand::LastError,
            other => {
                return Err(CliError::Validation(format!(
                    "Unknown command '{other}'. Type 'help' to see available commands."
                )))
            }
        };
        Ok(Some(command))
    }
}

/// Executes shell commands against the process-wide context
pub struct CommandExecutor<'a> {
    context: TenantContext,
    console: &'a dyn Console,
    browser: &'a dyn SamlBrowser,
    catalog: ExtensionCatalog,
}

impl<'a> CommandExecutor<'a> {
    /// `extensions` are listed after the builtin operations
    pub fn new(
        context: TenantContext,
        console: &'a dyn Console,
        browser: &'a dyn SamlBrowser,
        extensions: &[&dyn ExtensionSource],
    ) -> Self {
        let mut sources: Vec<&dyn ExtensionSource> = Vec::with_capacity(extensions.len() + 1);
        sources.push(&BuiltinOperations);
        sources.extend_from_slice(extensions);

        Self {
            context,
            console,
            browser,
            catalog: ExtensionCatalog::load(&sources),
        }
    }

    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    /// Every word the shell accepts as a command, for completion
    pub fn command_names(&self) -> Vec<String> {
        self.catalog
            .by_kind(ExtensionKind::Function)
            .map(|script| script.name.clone())
            .chain(["help", "exit"].map(String::from))
            .collect()
    }

    /// Execute a command line entered by the user
    pub async fn execute(&self, line: &str) -> CliResult<ExecuteResult> {
        let Some(command) = ShellCommand::parse(line)? else {
            return Ok(ExecuteResult::Empty);
        };

        match command {
            ShellCommand::Exit => return Ok(ExecuteResult::Exit),
            ShellCommand::Help { topic } => self.show_help(topic.as_deref()),
            ShellCommand::Connect { host, user } => self.connect(&host, user).await?,
            ShellCommand::Invoke {
                call,
                payload,
                host,
            } => {
                let result = self
                    .context
                    .invoker()
                    .invoke_host(host.as_deref(), &call, payload.as_deref())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            ShellCommand::Use { host } => {
                if !self.context.registry.set_default(&host) {
                    return Err(CliError::Validation(format!("No session for '{host}'")));
                }
                print_success(&format!("Default session is now {host}"));
            }
            ShellCommand::Sessions => self.list_sessions(),
            ShellCommand::Disconnect { host } => {
                let host = host
                    .or_else(|| self.context.registry.default_host())
                    .ok_or_else(|| CliError::Validation("No session to disconnect".into()))?;
                match self.context.registry.remove(&host) {
                    Some(session) => print_success(&format!("Disconnected from {}", session.host)),
                    None => print_warning(&format!("No session for '{host}'")),
                }
            }
            ShellCommand::LastError => self.show_last_error(),
        }

        Ok(ExecuteResult::Continue)
    }

    async fn connect(&self, host: &str, user: Option<String>) -> CliResult<()> {
        let user = match user {
            Some(user) => user,
            None => self
                .console
                .prompt_text("User")?
                .ok_or_else(|| CliError::Validation("A user name is required".into()))?,
        };

        let authenticator = self.context.authenticator(self.console, self.browser);
        if let Connected::Session(session) = authenticator
            .connect(host, &CredentialSpec::interactive(user))
            .await?
        {
            print_success(&format!(
                "Connected to {} as {}",
                session.host,
                session.principal()
            ));
        }
        Ok(())
    }

    fn list_sessions(&self) {
        let registry = &self.context.registry;
        let sessions = registry.sessions();
        if sessions.is_empty() {
            print_info("No sessions. Use 'connect <host>' to create one.");
            return;
        }

        let default = registry.default_host();
        for session in sessions {
            let marker = if default.as_deref() == Some(session.host.as_str()) {
                "*"
            } else {
                " "
            };
            let validated = session
                .last_validated_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!(
                "{marker} {:<40} {:<30} validated: {validated}",
                session.host,
                session.principal()
            );
        }
    }

    fn show_last_error(&self) {
        let Some(error) = self.context.registry.last_error() else {
            print_info("No API errors recorded.");
            return;
        };

        print_key_value("Message", &error.message);
        print_key_value("Kind", &error.kind.to_string());
        print_key_value("Occurred", &error.occurred_at.to_rfc3339());
        if let Some(call) = &error.call {
            print_key_value("Call", call);
        }
        if let Some(excerpt) = error.payload_excerpt() {
            print_key_value("Payload", &excerpt);
        }
        if let Some(cause) = &error.cause {
            print_key_value("Cause", cause);
        }
        if let Some(raw) = &error.raw_response {
            let shown = crate::logging::Redactor::new().redact(raw);
            print_key_value("Response", &truncate(&shown, RAW_RESPONSE_PREVIEW));
        }
    }

    fn show_help(&self, topic: Option<&str>) {
        if let Some(topic) = topic {
            match self.catalog.get(topic) {
                Some(script) => {
                    println!("{} - {}", script.name, script.content);
                    if let Some(usage) = script.source_locator.strip_prefix("builtin:") {
                        println!();
                        println!("Usage: {usage}");
                    }
                }
                None => {
                    println!("Unknown command: '{topic}'");
                    println!("Type 'help' to see available commands.");
                }
            }
            return;
        }

        println!("Available commands:");
        println!();
        for script in self.catalog.by_kind(ExtensionKind::Function) {
            println!("  {:<14} {}", script.name, script.content);
        }
        let classes: Vec<_> = self.catalog.by_kind(ExtensionKind::Class).collect();
        if !classes.is_empty() {
            println!();
            println!("Extension classes:");
            for script in classes {
                println!("  {:<14} {}", script.name, script.source_locator);
            }
        }
        println!();
        println!("Shell commands:");
        println!("  help <cmd>     Show help for a command");
        println!("  exit/quit      Exit the shell");
    }
}

fn required(positional: &[String], index: usize, usage: &str) -> CliResult<String> {
    positional
        .get(index)
        .cloned()
        .ok_or_else(|| CliError::Validation(format!("Usage: {usage}")))
}

/// Separate `--key value` pairs from positional arguments
fn split_flags(args: &[String]) -> CliResult<(Vec<String>, Vec<(String, String)>)> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.strip_prefix("--") {
            Some(key) if !key.is_empty() => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::Validation(format!("--{key} needs a value")))?;
                flags.push((key.to_string(), value.clone()));
            }
            _ => positional.push(arg.clone()),
        }
    }
    Ok((positional, flags))
}

/// Split a command line into arguments, respecting quotes
fn parse_args(line: &str) -> CliResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for c in line.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match (quote, c) {
            (None, '\\') => {
                escape_next = true;
                in_token = true;
            }
            (Some('"'), '\\') => escape_next = true,
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (Some(q), _) if c == q => quote = None,
            (None, _) if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CliError::Validation("Unclosed quote in command".to_string()));
    }
    if in_token {
        args.push(current);
    }

    Ok(args)
}
