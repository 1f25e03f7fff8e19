//! Token extraction from sign-in pages and redirect URLs

use crate::error::AuthError;
use scraper::{Html, Selector};
use url::Url;

/// Value of the non-empty hidden `<input>` named `name`
pub fn extract_hidden_field(html: &str, name: &str) -> Option<String> {
    let selector = Selector::parse("input[name]").ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        })
        .filter(|input| input.value().attr("name") == Some(name))
        .filter_map(|input| input.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Value of query parameter `name`, if present and non-empty
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Hidden fields the assertion consumer hands on to `signin-oidc`
#[derive(Clone, PartialEq, Eq)]
pub struct FederationFields {
    pub code: String,
    pub state: String,
    pub iss: String,
}

impl FederationFields {
    /// Scrape `code`, `state` and `iss`; any one missing fails the login
    pub fn scrape(html: &str) -> Result<Self, AuthError> {
        let field = |name: &str| {
            extract_hidden_field(html, name).ok_or_else(|| {
                AuthError::FederationFailed(format!(
                    "sign-in page did not contain the '{name}' field"
                ))
            })
        };

        Ok(Self {
            code: field("code")?,
            state: field("state")?,
            iss: field("iss")?,
        })
    }

    pub fn as_form(&self) -> [(&str, &str); 3] {
        [
            ("code", self.code.as_str()),
            ("state", self.state.as_str()),
            ("iss", self.iss.as_str()),
        ]
    }
}

impl std::fmt::Debug for FederationFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederationFields")
            .field("code", &crate::logging::REDACTED)
            .field("state", &self.state)
            .field("iss", &self.iss)
            .finish()
    }
}
