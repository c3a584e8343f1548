pub mod prompt;
pub mod openrouter;
pub mod stub;

pub use prompt::*;
pub use openrouter::*;
pub use stub::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Cannot reach model provider at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Unexpected provider response shape: {0}")]
    ResponseShape(String),

    #[error("Provider API key is not configured")]
    MissingApiKey,
}

/// One prior turn of the support conversation, forwarded to the model for
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant"; anything else is dropped before sending.
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// External language-model provider.
///
/// The response is expected (not guaranteed) to be the JSON object the
/// system prompt demands — the validator downstream must cope with
/// anything. Implementations carry their own timeout budget.
pub trait ModelClient: Send + Sync {
    fn analyze(&self, text: &str, context: &[ChatTurn]) -> Result<String, ModelError>;
}
