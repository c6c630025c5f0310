//! Shared configuration for wardline tools.
//!
//! A single TOML file merged with `WARDLINE_*` environment variables, and
//! translation to `wardline_core::ClientConfig`. The CLI layers its own
//! flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wardline_core::{ClientConfig, DEFAULT_API_URL, FileStore, TlsVerification};

/// Environment variable prefix, e.g. `WARDLINE_API_URL`.
pub const ENV_PREFIX: &str = "WARDLINE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Search debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Items per page for listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Query parameter the listing filter is sent as.
    #[serde(default = "default_search_param")]
    pub search_param: String,

    /// Where the session is persisted. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates (local development only).
    #[serde(default)]
    pub insecure: bool,

    /// Default output format for the CLI.
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode for the CLI: auto, always, never.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            search_param: default_search_param(),
            session_file: None,
            ca_cert: None,
            insecure: false,
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_page_size() -> u32 {
    12
}
fn default_search_param() -> String {
    "city".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "wardline").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wardline");
    p
}

/// Where the session file lives for this config.
pub fn session_path(cfg: &Config) -> Result<PathBuf, ConfigError> {
    cfg.session_file
        .clone()
        .or_else(FileStore::default_path)
        .ok_or_else(|| ConfigError::Validation {
            field: "session_file".into(),
            reason: "no data directory available; set session_file".into(),
        })
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate and convert into the core's runtime config.
pub fn to_client_config(cfg: &Config) -> Result<ClientConfig, ConfigError> {
    let api_url: url::Url = cfg.api_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {}", cfg.api_url),
    })?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", api_url.scheme()),
        });
    }

    if cfg.page_size == 0 {
        return Err(ConfigError::Validation {
            field: "page_size".into(),
            reason: "must be at least 1".into(),
        });
    }
    if cfg.search_param.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "search_param".into(),
            reason: "must not be empty".into(),
        });
    }

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ClientConfig {
        tls,
        timeout: Duration::from_secs(cfg.timeout_secs),
        debounce: Duration::from_millis(cfg.debounce_ms),
        page_size: cfg.page_size,
        search_param: cfg.search_param.trim().to_owned(),
        ..ClientConfig::new(api_url)
    })
}
