//! `src-dir` subcommand: run only the source directory resolver.

use std::io::{self, Write};

use anyhow::Result;

use crate::cli::{BehaviorOptions, OutputFormat, ProjectArgs, hook_options};
use crate::color::ColorScheme;
use crate::commands::{fail, load_project, styled_summary};
use crate::hook::prepare_environment;
use crate::resolver::{Resolution, resolve_source_dir};

/// Resolve the effective source directory and print it.
///
/// # Arguments
/// * `project` - Project and environment inputs.
/// * `format` - Output format for stdout.
/// * `behavior` - Verbosity flags; `--quiet` suppresses the summary line.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_src_dir_command(
  project: &ProjectArgs,
  format: OutputFormat,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) {
  if let Err(error) = run_src_dir_command(project, format, behavior, colors) {
    fail(colors, "Failed to resolve source directory", &error);
  }
}

fn run_src_dir_command(
  project: &ProjectArgs,
  format: OutputFormat,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) -> Result<()> {
  let config = load_project(project)?;
  let options = hook_options(project, None, false)?;
  let mut prepared = prepare_environment(&options, &config)?;

  let resolution = resolve_source_dir(&mut prepared.environment, prepared.override_dir.as_deref(), &options.layout);
  print_resolution(
    &resolution,
    format,
    behavior.quiet,
    colors,
    &mut io::stdout(),
    &mut io::stderr(),
  )
}

/// Write a resolver result in the requested format.
///
/// The summary line goes to `out` for text and to `err` otherwise, so `out`
/// stays machine-readable for `env` and `json`.
pub(crate) fn print_resolution(
  resolution: &Resolution,
  format: OutputFormat,
  quiet: bool,
  colors: &ColorScheme,
  out: &mut dyn Write,
  err: &mut dyn Write,
) -> Result<()> {
  match format {
    OutputFormat::Text => {
      if !quiet {
        writeln!(out, "{}", styled_summary(resolution, colors))?;
      }
    }
    OutputFormat::Env => {
      if !quiet {
        writeln!(err, "{}", styled_summary(resolution, colors))?;
      }
      writeln!(out, "PROJECT_SRC_DIR={}", resolution.src_dir.display())?;
    }
    OutputFormat::Json => {
      if !quiet {
        writeln!(err, "{}", styled_summary(resolution, colors))?;
      }
      writeln!(out, "{}", serde_json::to_string_pretty(resolution)?)?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::cli::ColorOption;
  use crate::resolver::SourceSelection;

  fn resolution() -> Resolution {
    Resolution {
      environment: "esp32_weapon".to_string(),
      selection: SourceSelection::Variant {
        marker: "weapon".to_string(),
      },
      src_dir: PathBuf::from("/proj/weapon/src"),
    }
  }

  fn render(format: OutputFormat, quiet: bool) -> (String, String) {
    let colors = ColorScheme::new(ColorOption::Never);
    let mut out = Vec::new();
    let mut err = Vec::new();
    print_resolution(&resolution(), format, quiet, &colors, &mut out, &mut err).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
  }

  #[test]
  fn test_text_summary_on_stdout() {
    let (out, err) = render(OutputFormat::Text, false);
    assert_eq!(out, "[esp32_weapon] Source Directory set to: /proj/weapon/src\n");
    assert!(err.is_empty());
  }

  #[test]
  fn test_text_quiet_prints_nothing() {
    assert_eq!(render(OutputFormat::Text, true), (String::new(), String::new()));
  }

  #[test]
  fn test_env_format_moves_summary_to_stderr() {
    let (out, err) = render(OutputFormat::Env, false);
    assert_eq!(out, "PROJECT_SRC_DIR=/proj/weapon/src\n");
    assert_eq!(err, "[esp32_weapon] Source Directory set to: /proj/weapon/src\n");

    let (out, err) = render(OutputFormat::Env, true);
    assert_eq!(out, "PROJECT_SRC_DIR=/proj/weapon/src\n");
    assert!(err.is_empty());
  }

  #[test]
  fn test_json_format_document() {
    let (out, err) = render(OutputFormat::Json, false);
    assert!(err.contains("Source Directory set to"));

    let document: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(document["environment"], "esp32_weapon");
    assert_eq!(document["src_dir"], "/proj/weapon/src");
    assert_eq!(document["selection"]["kind"], "variant");
    assert_eq!(document["selection"]["marker"], "weapon");
  }
}
