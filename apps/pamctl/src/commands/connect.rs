//! Connect command - authenticate to a tenant

use clap::Args;
use pamctl::auth::Connected;
use pamctl::error::{CliError, CliResult};
use pamctl::federation::TerminalSamlBrowser;
use pamctl::interactive::{Console, TerminalConsole};
use pamctl::models::CredentialSpec;
use pamctl::output::{print_key_value, print_success};

/// Arguments for the connect command
#[derive(Args)]
pub struct ConnectArgs {
    /// Tenant host, e.g. abc1234.id.example.cloud (defaults to default_host)
    pub host: Option<String>,

    /// User to log in as
    #[arg(long, short, conflicts_with = "client_id")]
    pub user: Option<String>,

    /// OAuth client id for a client-credentials login
    #[arg(long, requires = "secret")]
    pub client_id: Option<String>,

    /// OAuth scope for a client-credentials login
    #[arg(long, default_value = "")]
    pub scope: String,

    /// OAuth client secret
    #[arg(long, env = "PAMCTL_CLIENT_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Don't open the browser for federated sign-in
    #[arg(long)]
    pub no_browser: bool,
}

impl ConnectArgs {
    fn credentials(&self, console: &dyn Console) -> CliResult<CredentialSpec> {
        if let Some(client_id) = &self.client_id {
            return Ok(CredentialSpec::ClientCredentials {
                client_id: client_id.clone(),
                scope: self.scope.clone(),
                secret: self.secret.clone().unwrap_or_default(),
            });
        }

        let user = match &self.user {
            Some(user) => user.clone(),
            None => console
                .prompt_text("User")?
                .ok_or_else(|| CliError::Validation("A user name is required".to_string()))?,
        };
        Ok(CredentialSpec::interactive(user))
    }
}

/// Execute the connect command
pub async fn execute(args: ConnectArgs) -> CliResult<()> {
    let (_, context) = super::load_context()?;
    let host = super::resolve_host(args.host.clone(), context.config())?;

    let console = TerminalConsole::new();
    let credentials = args.credentials(&console)?;
    if matches!(credentials, CredentialSpec::Interactive { .. }) {
        console.require_interactive()?;
    }

    let browser = TerminalSamlBrowser::new(args.no_browser);
    let authenticator = context.authenticator(&console, &browser);

    if let Connected::Session(session) = authenticator.connect(&host, &credentials).await? {
        print_success(&format!("Connected to {}", session.host));
        print_key_value("User", session.principal());
        print_key_value("Started", &session.started_at.to_rfc3339());
    }
    Ok(())
}
