//! Sensitive data redaction
//!
//! Pattern-based masking of passwords, challenge answers, bearer tokens and
//! SAML material before anything reaches a log line or an error message.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// The replacement string used for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Built-in redaction patterns for sensitive data
static REDACTION_PATTERNS: LazyLock<Vec<RedactionPattern>> = LazyLock::new(|| {
    vec![
        // Authorization header with Bearer token
        RedactionPattern::new(r"(?i)(Authorization:\s*Bearer\s+)\S+", |caps| {
            format!("{}{REDACTED}", &caps[1])
        }),
        // Secret-bearing JSON string fields
        RedactionPattern::new(
            r#"(?i)("(?:answer|password|secret|client_secret|token|access_token|refresh_token|id_token|samlresponse)"\s*:\s*")[^"]*""#,
            |caps| format!("{}{REDACTED}\"", &caps[1]),
        ),
        // Secret-bearing form or query fields
        RedactionPattern::new(
            r"(?i)((?:^|[?&\s])(?:samlresponse|password|secret|answer|code)=)[^&\s]+",
            |caps| format!("{}{REDACTED}", &caps[1]),
        ),
        // Credentials in URLs (user:password@host)
        RedactionPattern::new(r"(://[^:/\s]+:)[^@\s]+(@)", |caps| {
            format!("{}{REDACTED}{}", &caps[1], &caps[2])
        }),
    ]
});

/// A pattern for detecting and redacting sensitive data
struct RedactionPattern {
    regex: Regex,
    replacer: Box<dyn Fn(&regex::Captures) -> String + Send + Sync>,
}

impl RedactionPattern {
    fn new<F>(pattern: &str, replacer: F) -> Self
    where
        F: Fn(&regex::Captures) -> String + Send + Sync + 'static,
    {
        Self {
            regex: Regex::new(pattern).expect("Invalid redaction pattern"),
            replacer: Box::new(replacer),
        }
    }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.regex
            .replace_all(input, |caps: &regex::Captures| (self.replacer)(caps))
    }
}

/// Redactor for sensitive data in strings
#[derive(Debug, Default, Clone, Copy)]
pub struct Redactor;

impl Redactor {
    pub fn new() -> Self {
        Self
    }

    /// Redact sensitive data from the input string
    pub fn redact<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut result: Cow<str> = Cow::Borrowed(input);

        for pattern in REDACTION_PATTERNS.iter() {
            let replaced = match pattern.apply(&result) {
                Cow::Owned(owned) => Some(owned),
                Cow::Borrowed(_) => None,
            };
            if let Some(owned) = replaced {
                result = Cow::Owned(owned);
            }
        }

        result
    }
}

/// Cap `input` at `max_chars` characters, marking the cut with an ellipsis
pub fn truncate(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &input[..idx]),
        None => input.to_string(),
    }
}
