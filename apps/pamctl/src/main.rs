//! pamctl - tenant session management and API invocation
//!
//! This CLI lets operators:
//! - Authenticate to a tenant (interactive MFA or federated SAML sign-in)
//! - Issue authenticated API calls against the tenant
//! - Keep several tenant sessions alive in an interactive shell

use clap::{Parser, Subcommand};
use pamctl::error::CliResult;
use pamctl::logging::{self, LogLevel};

mod commands;

/// pamctl - Tenant session and API client
#[derive(Parser)]
#[command(name = "pamctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show progress information
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Show debug output (HTTP exchanges, state transitions)
    #[arg(long, global = true)]
    debug: bool,

    /// Show trace output (redacted response bodies)
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate to a tenant
    Connect(commands::connect::ConnectArgs),

    /// Connect and issue a single API call
    Invoke(commands::invoke::InvokeArgs),

    /// Print the base64 client:password string for a service user
    EncodeSecret(commands::encode_secret::EncodeSecretArgs),

    /// Start an interactive shell session
    Shell(commands::shell::ShellArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(LogLevel::from_flags(cli.verbose, cli.debug, cli.trace));

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Connect(args) => commands::connect::execute(args).await,
        Commands::Invoke(args) => commands::invoke::execute(args).await,
        Commands::EncodeSecret(args) => commands::encode_secret::execute(args).await,
        Commands::Shell(args) => commands::shell::execute(args).await,
    }
}
