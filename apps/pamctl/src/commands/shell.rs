//! Shell command - interactive session keeping connections alive

use clap::Args;
use pamctl::error::CliResult;
use pamctl::federation::TerminalSamlBrowser;
use pamctl::interactive::TerminalConsole;
use pamctl::output::print_info;
use pamctl::repl::{CommandExecutor, Completer, ExecuteResult, Prompt};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::Arc;

/// Arguments for the shell command
#[derive(Args)]
pub struct ShellArgs {
    /// Don't open the browser for federated sign-in
    #[arg(long)]
    pub no_browser: bool,
}

/// Execute the shell command
pub async fn execute(args: ShellArgs) -> CliResult<()> {
    let (paths, context) = super::load_context()?;
    let console = TerminalConsole::new();
    console.require_interactive()?;
    let browser = TerminalSamlBrowser::new(args.no_browser);

    let registry = Arc::clone(&context.registry);
    let executor = CommandExecutor::new(context, &console, &browser, &[]);

    let mut editor: Editor<Completer, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(Completer::new(executor.command_names(), Arc::clone(&registry))));

    paths.ensure_dir_exists()?;
    if editor.load_history(&paths.history_file).is_err() {
        tracing::debug!("no shell history yet");
    }

    print_info("pamctl shell. Type 'help' for commands, 'exit' to quit.");

    loop {
        match editor.readline(&Prompt::generate_auto(&registry)) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                match executor.execute(&line).await {
                    Ok(ExecuteResult::Exit) => break,
                    Ok(ExecuteResult::Continue | ExecuteResult::Empty) => {}
                    Err(e) => e.print(),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Err(e) = editor.save_history(&paths.history_file) {
        tracing::warn!(error = %e, "failed to save shell history");
    }
    Ok(())
}
