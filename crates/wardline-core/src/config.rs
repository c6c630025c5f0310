// ── Runtime client configuration ──
//
// Describes *where* the API lives and how the core should pace requests.
// Never touches disk: the config crate or CLI builds a `ClientConfig`
// and hands it in.

use std::time::Duration;

use url::Url;
use wardline_api::transport::{TlsMode, TransportConfig};

/// Public deployment of the hospital directory API.
pub const DEFAULT_API_URL: &str = "https://hospital-management-system-2-pi5t.onrender.com";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to one API deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL.
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Quiet period after the last keystroke before a search fetch is issued.
    pub debounce: Duration,
    /// Items per page for collection views.
    pub page_size: u32,
    /// Query parameter carrying the free-text filter on the list endpoint.
    pub search_param: String,
}

impl ClientConfig {
    /// Config for `api_url` with the deployment's pacing and paging
    /// defaults. Parsing the URL is the caller's job, so this cannot fail.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(15),
            debounce: Duration::from_millis(300),
            page_size: 12,
            search_param: "city".into(),
        }
    }

    /// Build the transport settings for the API client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_deployment_pacing() {
        let cfg = ClientConfig::new(Url::parse(DEFAULT_API_URL).unwrap());
        assert_eq!(cfg.api_url.as_str(), format!("{DEFAULT_API_URL}/"));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.search_param, "city");
        assert_eq!(cfg.debounce, Duration::from_millis(300));
        assert_eq!(cfg.page_size, 12);
        assert_eq!(cfg.transport().timeout, Duration::from_secs(15));
    }
}
