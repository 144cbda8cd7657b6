//! `header` subcommand: run only the version header generator.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cli::{BehaviorOptions, HeaderArgs, ProjectArgs, hook_options};
use crate::color::ColorScheme;
use crate::commands::{fail, load_project};
use crate::environment::BuildEnvironment;
use crate::hook::{HookOptions, MissingEnvironment, generate_header, prepare_environment};
use crate::project::ProjectOptions;
use crate::version_header::{VersionHeader, WriteOutcome};

/// Generate (or print) the version header.
///
/// The header only depends on compile definitions, so a missing environment
/// name is tolerated here: the command then works from `-D` flags alone.
pub(crate) fn handle_header_command(
  project: &ProjectArgs,
  header: &HeaderArgs,
  print: bool,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) {
  if let Err(error) = run_header_command(project, header, print, behavior, colors) {
    fail(colors, "Failed to generate version header", &error);
  }
}

fn run_header_command(
  project: &ProjectArgs,
  header: &HeaderArgs,
  print: bool,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) -> Result<()> {
  let config = load_project(project)?;
  let options = hook_options(project, Some(header), print)?;
  write_header(&options, &config, Utc::now(), behavior.quiet, colors, &mut io::stdout())
}

/// Environment for the generator, falling back to explicit definitions only
/// when no environment can be named.
fn header_environment(options: &HookOptions, config: &dyn ProjectOptions) -> Result<BuildEnvironment> {
  match prepare_environment(options, config) {
    Ok(prepared) => Ok(prepared.environment),
    Err(error) if error.downcast_ref::<MissingEnvironment>().is_some() => {
      debug!("No build environment; using command-line definitions only");
      Ok(BuildEnvironment::new("", &options.project_dir).with_definitions(options.definitions.iter().cloned().collect()))
    }
    Err(error) => Err(error),
  }
}

/// Run the generator and report to `out`.
///
/// With `options.dry_run` set (the `--print` flag) the rendered header text is
/// written to `out` and nothing touches the disk.
pub(crate) fn write_header(
  options: &HookOptions,
  config: &dyn ProjectOptions,
  now: DateTime<Utc>,
  quiet: bool,
  colors: &ColorScheme,
  out: &mut dyn Write,
) -> Result<()> {
  let environment = header_environment(options, config)?;

  if options.dry_run {
    let rendered = VersionHeader::from_definitions(environment.definitions(), &options.header.version_symbol, now);
    write!(out, "{}", rendered.render())?;
    return Ok(());
  }

  let report = generate_header(&environment, options, now)?;
  if !quiet {
    writeln!(
      out,
      "{}",
      describe_outcome(report.outcome, &report.path, &report.header.version, colors)
    )?;
  }
  Ok(())
}

/// One-line status for a header write.
pub(crate) fn describe_outcome(outcome: WriteOutcome, path: &Path, version: &str, colors: &ColorScheme) -> String {
  match outcome {
    WriteOutcome::Unchanged => format!(
      "{} {} {}",
      colors.success("✓"),
      colors.path(path.display()),
      colors.dimmed("unchanged")
    ),
    WriteOutcome::Created | WriteOutcome::Updated => format!(
      "{} {} {} ({})",
      colors.success("✓"),
      if outcome == WriteOutcome::Created { "Created" } else { "Updated" },
      colors.path(path.display()),
      colors.number(version)
    ),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use chrono::TimeZone;
  use tempfile::tempdir;

  use super::*;
  use crate::cli::ColorOption;
  use crate::definitions::Definition;
  use crate::project::ProjectConfig;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
  }

  fn colors() -> ColorScheme {
    ColorScheme::new(ColorOption::Never)
  }

  fn options(project_dir: &Path) -> HookOptions {
    HookOptions {
      project_dir: project_dir.to_path_buf(),
      definitions: vec![Definition::NameValue("RAYZ_VERSION".into(), "\"4.1.0\"".into())],
      ..HookOptions::default()
    }
  }

  #[test]
  fn test_describe_outcome_without_colors() {
    let path = Path::new("/proj/include/version.h");

    assert_eq!(
      describe_outcome(WriteOutcome::Created, path, "2.3.1", &colors()),
      "✓ Created /proj/include/version.h (2.3.1)"
    );
    assert_eq!(
      describe_outcome(WriteOutcome::Unchanged, path, "2.3.1", &colors()),
      "✓ /proj/include/version.h unchanged"
    );
  }

  #[test]
  fn test_missing_environment_uses_explicit_definitions() {
    let temp_dir = tempdir().unwrap();
    let mut out = Vec::new();

    write_header(
      &options(temp_dir.path()),
      &ProjectConfig::default(),
      now(),
      false,
      &colors(),
      &mut out,
    )
    .unwrap();

    let header_path = temp_dir.path().join("include").join("version.h");
    let written = std::fs::read_to_string(&header_path).unwrap();
    assert!(written.contains("#define RAYZ_VERSION_STR \"4.1.0\"\n"));
    assert_eq!(
      String::from_utf8(out).unwrap(),
      format!("✓ Created {} (4.1.0)\n", header_path.display())
    );
  }

  #[test]
  fn test_named_environment_reads_build_flags() {
    let temp_dir = tempdir().unwrap();
    let mut project = HashMap::new();
    project.insert("build_flags".to_string(), "-DRAYZ_VERSION=\\\"0.7.0\\\"".to_string());

    let mut opts = options(temp_dir.path());
    opts.env_name = Some("esp32_target".to_string());
    opts.definitions.clear();

    let mut out = Vec::new();
    write_header(&opts, &project, now(), true, &colors(), &mut out).unwrap();

    assert!(out.is_empty());
    let written = std::fs::read_to_string(temp_dir.path().join("include/version.h")).unwrap();
    assert!(written.contains("\"0.7.0\""));
  }

  #[test]
  fn test_print_renders_without_writing() {
    let temp_dir = tempdir().unwrap();
    let mut opts = options(temp_dir.path());
    opts.dry_run = true;

    let mut out = Vec::new();
    write_header(&opts, &ProjectConfig::default(), now(), false, &colors(), &mut out).unwrap();

    assert_eq!(
      String::from_utf8(out).unwrap(),
      "// Auto-generated version header\n\
       #pragma once\n\
       #define RAYZ_VERSION_STR \"4.1.0\"\n\
       #define RAYZ_BUILD_UTC \"2025-06-01T08:30:00Z\"\n"
    );
    assert!(!temp_dir.path().join("include").exists());
  }
}
