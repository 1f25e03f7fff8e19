//! The `{Success, Result, Message}` wrapper every tenant response uses

use serde::{Deserialize, Serialize};

/// Tenant response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    #[serde(rename = "Success", default)]
    pub success: bool,

    #[serde(rename = "Result")]
    pub result: Option<T>,

    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The tenant's own message, or a generic fallback
    pub fn failure_message(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("The tenant reported failure without a message")
            .to_string()
    }
}
