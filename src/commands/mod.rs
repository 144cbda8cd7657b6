//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `fw-prebuild` subcommand,
//! keeping `cli.rs` focused on argument definitions while the handlers share
//! project loading and failure reporting.

use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use crate::color::ColorScheme;
use crate::hook::MissingEnvironment;
use crate::project::ProjectConfig;
use crate::resolver::Resolution;

pub mod completions;
pub mod header;
pub mod run;
pub mod src_dir;
pub mod version;

/// Load the project configuration named by `project`.
pub(crate) fn load_project(project: &ProjectArgs) -> Result<ProjectConfig> {
  let path = project.config_path();
  load_project_file(&path)
}

fn load_project_file(path: &Path) -> Result<ProjectConfig> {
  ProjectConfig::load(path).with_context(|| format!("Failed to load project configuration {}", path.display()))
}

/// Exit status for a failed command: 4 for input problems, 1 otherwise.
pub(crate) fn exit_code(error: &anyhow::Error) -> i32 {
  if error.downcast_ref::<MissingEnvironment>().is_some() {
    4
  } else {
    1
  }
}

/// Print a failure summary to stderr and exit.
pub(crate) fn fail(colors: &ColorScheme, headline: &str, error: &anyhow::Error) -> ! {
  eprintln!("{} {}", colors.error("✗"), colors.error(headline));
  eprintln!("  {}: {:#}", colors.emphasis("Error"), error);
  process::exit(exit_code(error));
}

/// Colored form of [`Resolution::summary`].
pub(crate) fn styled_summary(resolution: &Resolution, colors: &ColorScheme) -> String {
  format!(
    "[{}] Source Directory set to: {}",
    colors.emphasis(&resolution.environment),
    colors.path(resolution.src_dir.display())
  )
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_exit_code_for_missing_environment() {
    let error = anyhow::Error::new(MissingEnvironment);
    assert_eq!(exit_code(&error), 4);
    assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 1);
  }

  #[test]
  fn test_load_project_file_reports_path() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("platformio.ini");
    std::fs::write(&path, "orphan = 1\n").unwrap();

    let error = load_project_file(&path).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("Failed to load project configuration"));
    assert!(message.contains("line 1"));
  }
}
