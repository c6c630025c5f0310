// ── Core error types ──
//
// User-facing errors from wardline-core. Consumers never match on HTTP
// status codes or JSON parse failures directly: the `From<wardline_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// Bad credentials or a registration conflict. `message` is the server's
    /// text verbatim when it sent one.
    #[error("{message}")]
    Authentication { message: String },

    /// The server rejected the session's token; the session has already
    /// been torn down locally.
    #[error("Session expired -- please log in again")]
    AuthorizationExpired,

    #[error("{message}")]
    ProfileUpdate { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    /// Network or server failure while fetching a page.
    #[error("{message}")]
    Fetch { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Session storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text suitable for showing inline to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication { message }
            | Self::ProfileUpdate { message }
            | Self::Fetch { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The server's own message, or `fallback` when it sent none.
pub(crate) fn message_or(err: &wardline_api::Error, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_owned()
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wardline_api::Error> for CoreError {
    fn from(err: wardline_api::Error) -> Self {
        match err {
            wardline_api::Error::Unauthorized { .. } => CoreError::AuthorizationExpired,
            wardline_api::Error::Http {
                status: 404,
                message,
            } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message.unwrap_or_default(),
            },
            wardline_api::Error::Http { status, message } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            wardline_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wardline_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wardline_api::Error::InvalidPathSegment { segment } => CoreError::Validation {
                message: format!("{segment:?} is not a valid identifier"),
            },
            wardline_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            wardline_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            wardline_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
