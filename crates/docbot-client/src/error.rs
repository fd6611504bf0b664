//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code or type from the server.
        code: String,
        /// Error message from the server.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A local file could not be read for upload.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Error {
    /// Check if this error means the requested resource does not exist.
    ///
    /// Ids with the wrong shape come back as `400 invalid_request_error`
    /// naming the id, which is the same situation from the caller's side.
    /// Other 400s are not treated as missing resources.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) | Error::Api { status: 404, .. } => true,
            Error::Api {
                status: 400,
                message,
                ..
            } => {
                let message = message.to_ascii_lowercase();
                message.contains("invalid") && names_an_id(&message)
            }
            _ => false,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if retrying the same request may succeed.
    ///
    /// Covers connection failures, timeouts, rate limiting and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => self.is_rate_limited() || self.is_server_error(),
        }
    }
}

/// Object id prefixes used by the Assistants API.
const ID_PREFIXES: [&str; 6] = ["asst_", "thread_", "vs_", "file_", "run_", "msg_"];

/// Whether a lowercased error message quotes an id parameter (`'thread_id'`)
/// or an id value (`'asst_abc'`).
fn names_an_id(message: &str) -> bool {
    message.contains("_id'")
        || message.contains("expected an id")
        || ID_PREFIXES
            .iter()
            .any(|prefix| message.contains(&format!("'{prefix}")))
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error envelope returned by the API.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
