//! Browser-side half of federated login

use crate::error::CliResult;
use crate::interactive::{Console, TerminalConsole};
use crate::logging::REDACTED;
use std::fmt;
use url::Url;

/// What the IdP posts back after the user signs in
#[derive(Clone)]
pub struct SamlAssertion {
    pub saml_response: String,
    /// Overrides the RelayState taken from the login URL when present
    pub relay_state: Option<String>,
}

impl fmt::Debug for SamlAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamlAssertion")
            .field("saml_response", &REDACTED)
            .field("relay_state", &self.relay_state)
            .finish()
    }
}

/// Obtains a SAML assertion for an IdP login URL
pub trait SamlBrowser: Send + Sync {
    fn obtain_assertion(&self, idp_login_url: &Url) -> CliResult<SamlAssertion>;
}

/// Opens the system browser and reads the assertion back from the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSamlBrowser {
    console: TerminalConsole,
    no_browser: bool,
}

impl TerminalSamlBrowser {
    pub fn new(no_browser: bool) -> Self {
        Self {
            console: TerminalConsole::new(),
            no_browser,
        }
    }
}

impl SamlBrowser for TerminalSamlBrowser {
    fn obtain_assertion(&self, idp_login_url: &Url) -> CliResult<SamlAssertion> {
        println!();
        println!("Sign in with your identity provider:");
        println!("  {idp_login_url}");
        println!();

        if !self.no_browser {
            if open::that(idp_login_url.as_str()).is_ok() {
                self.console.notify("Browser opened. Complete sign-in there.");
            } else {
                self.console
                    .notify("Could not open browser. Please visit the URL above manually.");
            }
        }

        let saml_response = self.console.prompt_secret("SAMLResponse")?;
        let relay_state = self.console.prompt_text("RelayState (Enter to keep)")?;

        Ok(SamlAssertion {
            saml_response: saml_response.trim().to_string(),
            relay_state,
        })
    }
}
