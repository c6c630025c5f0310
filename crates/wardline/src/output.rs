//! Rendering for `--output`.
//!
//! Lists become `tabled` tables, single records become aligned key/value
//! blocks. JSON and YAML serialize the wire types directly so scripts see
//! the same field names the API returns. Data goes to stdout, status lines
//! to stderr.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color ────────────────────────────────────────────────────────────

/// Color decisions follow stderr, where all decorated text goes.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

pub fn success(text: &str, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    format!("{} {text}", "✓".green())
}

/// Secondary text such as page footers.
pub fn muted(text: &str, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    text.dimmed().to_string()
}

// ── Rendering ────────────────────────────────────────────────────────

/// JSON / YAML rendering shared by lists and single records. `None` means
/// the format is human-oriented and the caller renders it.
fn structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data)
            .map(|y| y.trim_end().to_owned())
            .map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(rendered.unwrap_or_else(|e| format!("error: could not serialize output: {e}")))
}

/// A collection: table rows via `to_row`, or one `key` per line for plain.
pub fn render_list<T, R>(
    format: OutputFormat,
    items: &[T],
    to_row: impl Fn(&T) -> R,
    key: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    if let Some(out) = structured(format, items) {
        return out;
    }
    if format == OutputFormat::Plain {
        return items.iter().map(key).collect::<Vec<_>>().join("\n");
    }
    let rows: Vec<R> = items.iter().map(to_row).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// A single record: `detail` for the table format, `key` for plain.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    item: &T,
    detail: impl Fn(&T) -> String,
    key: impl Fn(&T) -> String,
) -> String {
    if let Some(out) = structured(format, item) {
        return out;
    }
    if format == OutputFormat::Plain {
        return key(item);
    }
    detail(item)
}

/// Right-aligned `key: value` lines. Pairs with an empty value are left out.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k:>width$}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Emitting ─────────────────────────────────────────────────────────

/// Rendered data to stdout. Suppressed by `--quiet`.
pub fn print_output(rendered: &str, quiet: bool) {
    if quiet || rendered.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{rendered}");
}

/// Status line to stderr. Suppressed by `--quiet`.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
