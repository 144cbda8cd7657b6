//! Version header generation.
//!
//! Renders `include/version.h` from the build's compile definitions and the
//! current UTC time, and only touches the file when the rendered text differs
//! from what is already on disk. Firmware build systems track headers by
//! modification time, so an unconditional write would force a rebuild of
//! every translation unit that includes it.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::definitions::{CompileDefinitions, Definition};

/// Definition consulted for the firmware version.
pub const DEFAULT_VERSION_SYMBOL: &str = "RAYZ_VERSION";
/// Version used when the symbol is defined without a value.
pub const UNKNOWN_VERSION: &str = "UNKNOWN";
/// Version used when the symbol is not defined at all.
pub const FALLBACK_VERSION: &str = "1.0.0";
pub const DEFAULT_INCLUDE_DIR: &str = "include";
pub const DEFAULT_HEADER_NAME: &str = "version.h";

/// Where the header lives and which definition feeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
  pub version_symbol: String,
  /// Include directory relative to the project root.
  pub include_dir: PathBuf,
  pub header_name: String,
}

impl Default for HeaderOptions {
  fn default() -> Self {
    Self {
      version_symbol: DEFAULT_VERSION_SYMBOL.to_string(),
      include_dir: PathBuf::from(DEFAULT_INCLUDE_DIR),
      header_name: DEFAULT_HEADER_NAME.to_string(),
    }
  }
}

impl HeaderOptions {
  /// Absolute location of the header for a given project.
  pub fn header_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.include_dir).join(&self.header_name)
  }
}

/// The values interpolated into the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionHeader {
  pub version: String,
  pub build_timestamp: String,
}

impl VersionHeader {
  /// Build header values from `definitions` at time `now`.
  pub fn from_definitions(definitions: &CompileDefinitions, symbol: &str, now: DateTime<Utc>) -> Self {
    Self {
      version: resolve_version(definitions, symbol),
      build_timestamp: format_build_timestamp(now),
    }
  }

  /// Render the full header text.
  pub fn render(&self) -> String {
    format!(
      "// Auto-generated version header\n\
       #pragma once\n\
       #define RAYZ_VERSION_STR \"{}\"\n\
       #define RAYZ_BUILD_UTC \"{}\"\n",
      escape_c_string(&self.version),
      escape_c_string(&self.build_timestamp)
    )
  }
}

/// Result of a conditional header write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
  /// The file did not exist and was written.
  Created,
  /// The file existed with different content and was replaced.
  Updated,
  /// The file already held identical content; nothing was written.
  Unchanged,
}

impl WriteOutcome {
  pub fn wrote(self) -> bool {
    !matches!(self, WriteOutcome::Unchanged)
  }
}

/// Summary of one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderReport {
  pub path: PathBuf,
  #[serde(flatten)]
  pub header: VersionHeader,
  pub outcome: WriteOutcome,
}

/// Extract the firmware version from the compile definitions.
///
/// * `SYMBOL="x.y.z"` yields `x.y.z` (one quote removed from each end)
/// * bare `SYMBOL` yields [`UNKNOWN_VERSION`]
/// * no `SYMBOL` yields [`FALLBACK_VERSION`]
pub fn resolve_version(definitions: &CompileDefinitions, symbol: &str) -> String {
  match definitions.lookup(symbol) {
    Some(Definition::NameValue(_, value)) => strip_quotes(value),
    Some(Definition::NameOnly(_)) => UNKNOWN_VERSION.to_string(),
    None => FALLBACK_VERSION.to_string(),
  }
}

/// Remove at most one `"` or `'` from each end.
///
/// INI build flags usually escape the quotes (`\"1.2.0\"`) so the shell keeps
/// them; those escapes are undone first. The ends are handled independently,
/// so an unbalanced `"2.3.1` still loses its quote.
fn strip_quotes(value: &str) -> String {
  let unescaped = value.replace("\\\"", "\"").replace("\\'", "'");
  let trimmed = unescaped.trim();
  let trimmed = trimmed.strip_prefix(['"', '\'']).unwrap_or(trimmed);
  trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed).to_string()
}

/// Format `now` as an ISO-8601 UTC timestamp.
///
/// Seconds precision, plus a six digit fractional part only when the
/// microsecond field is non-zero, then a literal `Z`.
pub fn format_build_timestamp(now: DateTime<Utc>) -> String {
  let mut stamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();

  let micros = now.timestamp_subsec_micros() % 1_000_000;
  if micros != 0 {
    stamp.push_str(&format!(".{micros:06}"));
  }

  stamp.push('Z');
  stamp
}

fn escape_c_string(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for ch in value.chars() {
    match ch {
      '\\' => escaped.push_str("\\\\"),
      '"' => escaped.push_str("\\\""),
      '\n' => escaped.push_str("\\n"),
      c => escaped.push(c),
    }
  }
  escaped
}

/// Render the header for `definitions` and write it under `project_dir` if
/// its content changed.
///
/// # Errors
/// Returns an error when the include directory cannot be created or the
/// header cannot be read or written.
pub fn generate_version_header(
  project_dir: &Path,
  definitions: &CompileDefinitions,
  options: &HeaderOptions,
  now: DateTime<Utc>,
) -> Result<HeaderReport> {
  let header = VersionHeader::from_definitions(definitions, &options.version_symbol, now);
  let path = options.header_path(project_dir);

  debug!(version = %header.version, timestamp = %header.build_timestamp, "Rendered version header");

  let outcome = write_if_changed(&path, &header.render())?;
  match outcome {
    WriteOutcome::Unchanged => info!("Version header up to date: {}", path.display()),
    _ => info!("Wrote version header {} ({})", path.display(), header.version),
  }

  Ok(HeaderReport { path, header, outcome })
}

/// Render the header and report what [`generate_version_header`] would do,
/// without creating directories or writing anything.
pub fn preview_version_header(
  project_dir: &Path,
  definitions: &CompileDefinitions,
  options: &HeaderOptions,
  now: DateTime<Utc>,
) -> Result<HeaderReport> {
  let header = VersionHeader::from_definitions(definitions, &options.version_symbol, now);
  let path = options.header_path(project_dir);
  let outcome = pending_outcome(&path, &header.render())?;
  Ok(HeaderReport { path, header, outcome })
}

fn pending_outcome(path: &Path, content: &str) -> Result<WriteOutcome> {
  match fs::read(path) {
    Ok(existing) if existing == content.as_bytes() => Ok(WriteOutcome::Unchanged),
    Ok(_) => Ok(WriteOutcome::Updated),
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(WriteOutcome::Created),
    Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
  }
}

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Missing parent directories are created. The write goes through a sibling
/// temporary file and a rename so readers never observe a partial header.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
  }

  let outcome = pending_outcome(path, content)?;
  if outcome.wrote() {
    write_atomic(path, content.as_bytes())?;
  } else {
    debug!("Content unchanged, skipping write of {}", path.display());
  }

  Ok(outcome)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
  let dir = path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));

  // Dropping the temp file on any early return removes it.
  let mut tmp =
    NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
  tmp
    .write_all(content)
    .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
  tmp
    .as_file()
    .sync_all()
    .with_context(|| format!("Failed to flush {}", tmp.path().display()))?;
  tmp
    .persist(path)
    .with_context(|| format!("Failed to write {}", path.display()))?;

  Ok(())
}
