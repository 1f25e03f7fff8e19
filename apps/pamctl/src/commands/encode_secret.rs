//! Encode-secret command - derive the base64 client:password string

use clap::Args;
use pamctl::auth::Connected;
use pamctl::error::CliResult;
use pamctl::federation::TerminalSamlBrowser;
use pamctl::interactive::{Console, TerminalConsole};
use pamctl::models::CredentialSpec;

/// Arguments for the encode-secret command
#[derive(Args)]
pub struct EncodeSecretArgs {
    /// Client (service user) name
    #[arg(long)]
    pub client: String,

    /// Password; prompted for when omitted
    #[arg(long, env = "PAMCTL_CLIENT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Execute the encode-secret command
pub async fn execute(args: EncodeSecretArgs) -> CliResult<()> {
    let (_, context) = super::load_context()?;
    let console = TerminalConsole::new();

    let password = match args.password {
        Some(password) => password,
        None => console.prompt_secret("Password")?,
    };
    let credentials = CredentialSpec::EncodeOnly {
        client: args.client,
        password,
    };

    let browser = TerminalSamlBrowser::new(true);
    let authenticator = context.authenticator(&console, &browser);
    if let Connected::EncodedSecret(encoded) = authenticator.connect("", &credentials).await? {
        println!("{encoded}");
    }
    Ok(())
}
