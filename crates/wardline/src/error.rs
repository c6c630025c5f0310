//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wardline_config::ConfigError;
use wardline_core::{CoreError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the API at {url}")]
    #[diagnostic(
        code(wardline::connection_failed),
        help(
            "Check your network connection and the configured API URL.\n\
             Override it with --api-url or WARDLINE_API_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(wardline::timeout),
        help("Increase timeout with --timeout; hosted instances can take a while to wake up.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(wardline::auth_failed),
        help("Check your email and password and try again.")
    )]
    AuthFailed { message: String },

    #[error("Not logged in")]
    #[diagnostic(code(wardline::not_logged_in), help("Run: wardline login"))]
    NotLoggedIn,

    #[error("Session expired -- you have been logged out")]
    #[diagnostic(code(wardline::session_expired), help("Run: wardline login"))]
    SessionExpired,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wardline::not_found),
        help("Run: wardline {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(wardline::fetch_failed))]
    FetchFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(wardline::profile_update_failed))]
    ProfileUpdateFailed { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(wardline::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wardline::validation))]
    Validation { field: String, reason: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(wardline::config),
        help("Inspect your settings with: wardline config show")
    )]
    Config(#[from] ConfigError),

    #[error("Session storage failed: {message}")]
    #[diagnostic(
        code(wardline::storage),
        help("Check permissions on the session file, or point session_file elsewhere.")
    )]
    Storage { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wardline::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(wardline::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(wardline::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotLoggedIn | Self::SessionExpired => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { message } => CliError::AuthFailed { message },
            CoreError::AuthorizationExpired => CliError::SessionExpired,
            CoreError::ProfileUpdate { message } => CliError::ProfileUpdateFailed { message },
            CoreError::Fetch { message } => CliError::FetchFailed { message },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },
            CoreError::Storage { message } => CliError::Storage { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Storage {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_share_exit_code() {
        let expired: CliError = CoreError::AuthorizationExpired.into();
        let rejected: CliError = CoreError::Authentication {
            message: "Invalid credentials".into(),
        }
        .into();
        assert_eq!(expired.exit_code(), exit_code::AUTH);
        assert_eq!(rejected.exit_code(), exit_code::AUTH);
        assert_eq!(rejected.to_string(), "Invalid credentials");
    }

    #[test]
    fn fetch_failure_keeps_message() {
        let err: CliError = CoreError::Fetch {
            message: "Failed to fetch hospitals".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Failed to fetch hospitals");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
