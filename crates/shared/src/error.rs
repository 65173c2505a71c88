use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the management backend attaches to non-2xx responses.
/// `detail` is optional; callers fall back to a generic message when the
/// body is missing or unparseable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Best-effort parse of a response body. Anything that is not the
    /// expected JSON shape yields an empty body rather than an error.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn detail_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail.as_deref().unwrap_or(fallback)
    }
}

/// Request-shaping failure. Resolved locally; a payload that fails
/// validation never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },
}

