//! `version` subcommand.
//!
//! Reports the hook's own build metadata, captured by `build.rs`, either as
//! colored text or as a JSON document for CI logs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::color::ColorScheme;

/// Build metadata embedded at compile time.
#[derive(Debug, Serialize)]
struct BuildInfo {
  version: &'static str,
  git_commit: &'static str,
  build_timestamp: String,
  target: &'static str,
  rust_version: &'static str,
}

impl BuildInfo {
  fn current() -> Self {
    Self {
      version: env!("CARGO_PKG_VERSION"),
      git_commit: env!("GIT_HASH"),
      build_timestamp: format_timestamp(env!("BUILD_TIMESTAMP")),
      target: env!("TARGET"),
      rust_version: env!("RUSTC_VERSION"),
    }
  }
}

/// Render version and build metadata in JSON or human-readable form.
///
/// # Arguments
/// * `json` - When `true`, emit a JSON document instead of colored text.
/// * `short` - When `true`, print only the semantic version string.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  let info = BuildInfo::current();

  if short {
    println!("{}", info.version);
    return;
  }

  if json {
    match serde_json::to_string_pretty(&info) {
      Ok(document) => println!("{document}"),
      Err(error) => eprintln!("{} {}", colors.error("Error:"), error),
    }
    return;
  }

  println!("{} {}", colors.emphasis("fw-prebuild"), colors.number(info.version));
  println!("{}: {}", colors.emphasis("Git commit"), colors.code(info.git_commit));
  println!("{}: {}", colors.emphasis("Built"), colors.dimmed(&info.build_timestamp));
  println!("{}: {}", colors.emphasis("Target"), info.target);
  println!("{}: {}", colors.emphasis("Rust version"), info.rust_version);
}

/// Convert Unix epoch seconds into an RFC 3339 UTC string, falling back to
/// the raw input when it is not a number.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    .map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string())
    .unwrap_or_else(|| timestamp.to_string())
}
