//! Clap derive structures for the `wardline` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wardline -- browse and manage the hospital directory from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "wardline",
    version,
    about = "Search and manage the hospital directory from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

/// File and `WARDLINE_*` environment settings are read by the config
/// loader; these flags override both.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file location
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login(LoginArgs),

    /// Create an account and log in
    Register(RegisterArgs),

    /// End the session
    Logout,

    /// Show the logged-in user (no network)
    Whoami,

    /// View or edit your profile
    Profile(ProfileArgs),

    /// Browse and manage hospitals
    #[command(alias = "h")]
    Hospitals(HospitalsArgs),

    /// List medical specialties
    Specialties,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted if omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Account role, if the server supports one
    #[arg(long)]
    pub role: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Fetch your profile from the server
    Show,

    /// Change profile fields
    Update {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New email
        #[arg(long)]
        email: Option<String>,
    },
}

// ── Hospitals ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HospitalsArgs {
    #[command(subcommand)]
    pub command: HospitalsCommand,
}

#[derive(Debug, Subcommand)]
pub enum HospitalsCommand {
    /// List hospitals page by page
    #[command(alias = "ls")]
    List {
        /// Filter text (sent as the configured search parameter)
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Page to show (1-based)
        #[arg(long, short = 'p', default_value = "1")]
        page: u32,

        /// Walk every page and print all results
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Show one hospital
    Get {
        /// Hospital ID
        id: String,
    },

    /// Free-text search across all hospitals (unpaged)
    Search {
        /// Search terms
        query: String,
    },

    /// Add a hospital
    Create(HospitalFields),

    /// Change a hospital
    Update {
        /// Hospital ID
        id: String,

        #[command(flatten)]
        fields: HospitalFields,
    },

    /// Remove a hospital
    Delete {
        /// Hospital ID
        id: String,
    },
}

/// Hospital body, from flags or a JSON file.
#[derive(Debug, Args)]
pub struct HospitalFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub rating: Option<f64>,

    /// Specialities (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub speciality: Vec<String>,

    /// Read the body from a JSON file instead
    #[arg(long, short = 'F', conflicts_with_all = ["name", "city", "image", "rating", "speciality"])]
    pub from_file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file (interactive when run in a terminal)
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
