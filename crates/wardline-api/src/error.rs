use thiserror::Error;

/// Top-level error type for the `wardline-api` crate.
///
/// Every failed call carries enough context for the core crate to decide
/// between "bad credentials", "session expired" and "server said no":
/// the HTTP status and the server's own `message` when it sent one.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The server answered 401. If the request carried a bearer token the
    /// token source has already been told to invalidate it.
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { message: Option<String> },

    // ── Server ──────────────────────────────────────────────────────
    /// Any other non-success status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message from server"))]
    Http { status: u16, message: Option<String> },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An id that cannot be sent as a single URL path segment.
    #[error("Invalid identifier: {segment:?}")]
    InvalidPathSegment { segment: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-provided `message`, verbatim.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_exposed_verbatim() {
        let err = Error::Unauthorized {
            message: Some("Invalid credentials".into()),
        };
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Unauthorized: Invalid credentials");
    }

    #[test]
    fn http_error_without_message_uses_placeholder() {
        let err = Error::Http {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 503: no message from server");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_not_found());
    }
}
