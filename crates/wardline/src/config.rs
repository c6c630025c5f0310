//! CLI flag overrides on top of the shared config, and construction of the
//! session-bound context every network command runs with.
//!
//! Core never sees these types -- it receives a pre-built `ClientConfig`.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use tracing::{debug, warn};

use wardline_config::Config;
use wardline_core::{ClientConfig, FileStore, SessionManager, StoreError};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a command handler needs.
pub struct Context {
    pub session: SessionManager,
    pub client: ClientConfig,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
}

/// Load file + env config and apply CLI flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = wardline_config::load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
    if let Some(ref path) = global.session_file {
        cfg.session_file = Some(path.clone());
    }
    if global.insecure {
        cfg.insecure = true;
    }
}

/// `--output` wins; otherwise the config's `output` value, falling back to table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

/// Build the runtime context and restore any persisted session.
pub fn build_context(global: &GlobalOpts) -> Result<Context, CliError> {
    let cfg = load(global)?;
    let client = wardline_config::to_client_config(&cfg)?;
    let session_path = wardline_config::session_path(&cfg)?;
    let store = open_store(&session_path)?;

    let session = SessionManager::new(&client, Arc::new(store))?;
    let status = session.initialize();
    debug!(%status, api = %client.api_url, "session initialized");

    Ok(Context {
        session,
        format: output_format(global, &cfg),
        color: output::should_color(color_mode(global, &cfg)),
        quiet: global.quiet,
        yes: global.yes,
        client,
    })
}

/// Open the session file. A file that no longer parses is replaced by an
/// empty store, which simply means logging in again.
fn open_store(path: &Path) -> Result<FileStore, CliError> {
    match FileStore::open(path) {
        Err(StoreError::Corrupt { .. }) => {
            warn!(path = %path.display(), "session file is corrupt, starting fresh");
            std::fs::remove_file(path)?;
            Ok(FileStore::open(path)?)
        }
        other => Ok(other?),
    }
}
