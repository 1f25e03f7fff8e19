//! Invoke command - connect and issue one API call

use clap::Args;
use pamctl::error::{CliError, CliResult};
use pamctl::federation::TerminalSamlBrowser;
use pamctl::interactive::TerminalConsole;
use pamctl::models::CredentialSpec;
use std::io::Read;

/// Arguments for the invoke command
#[derive(Args)]
pub struct InvokeArgs {
    /// Tenant host
    pub host: String,

    /// API call path relative to the tenant root, e.g. Redrock/query
    pub call: String,

    /// JSON payload; "-" reads it from stdin
    #[arg(long, short)]
    pub payload: Option<String>,

    /// User to log in as
    #[arg(long, short)]
    pub user: String,

    /// Don't open the browser for federated sign-in
    #[arg(long)]
    pub no_browser: bool,
}

/// Execute the invoke command
pub async fn execute(args: InvokeArgs) -> CliResult<()> {
    let payload = match args.payload.as_deref() {
        Some("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        other => other.map(str::to_string),
    };
    if let Some(payload) = payload.as_deref().filter(|p| !p.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(payload)
            .map_err(|e| CliError::Validation(format!("Payload is not valid JSON: {e}")))?;
    }

    let (_, context) = super::load_context()?;
    let console = TerminalConsole::new();
    console.require_interactive()?;
    let browser = TerminalSamlBrowser::new(args.no_browser);

    context
        .authenticator(&console, &browser)
        .connect(&args.host, &CredentialSpec::interactive(args.user))
        .await?;

    let result = context
        .invoker()
        .invoke_host(Some(&args.host), &args.call, payload.as_deref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
