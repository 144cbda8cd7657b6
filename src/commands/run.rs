//! `run` subcommand: the full pre-build hook.
//!
//! The resolved source directory is reported before the header step runs so
//! a host build system reading stdout line by line sees it even if header
//! generation later fails.

use std::io::{self, Write};

use anyhow::Result;
use chrono::Utc;

use crate::cli::{BehaviorOptions, HeaderArgs, OutputFormat, ProjectArgs, hook_options};
use crate::color::ColorScheme;
use crate::commands::header::describe_outcome;
use crate::commands::src_dir::print_resolution;
use crate::commands::{fail, load_project, styled_summary};
use crate::hook::{HookReport, generate_header, prepare_environment};
use crate::resolver::{Resolution, resolve_source_dir};

/// Run the resolver and the header generator in sequence.
///
/// # Arguments
/// * `project` - Project and environment inputs.
/// * `header` - Version header location and symbol.
/// * `format` - Output format for stdout.
/// * `dry_run` - When `true`, nothing is written to disk.
/// * `behavior` - Verbosity flags.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_run_command(
  project: &ProjectArgs,
  header: &HeaderArgs,
  format: OutputFormat,
  dry_run: bool,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) {
  if let Err(error) = run_hook_command(project, header, format, dry_run, behavior, colors) {
    fail(colors, "Pre-build hook failed", &error);
  }
}

fn run_hook_command(
  project: &ProjectArgs,
  header: &HeaderArgs,
  format: OutputFormat,
  dry_run: bool,
  behavior: &BehaviorOptions,
  colors: &ColorScheme,
) -> Result<()> {
  let config = load_project(project)?;
  let options = hook_options(project, Some(header), dry_run)?;
  let mut prepared = prepare_environment(&options, &config)?;

  let resolution = resolve_source_dir(&mut prepared.environment, prepared.override_dir.as_deref(), &options.layout);
  report_resolution(
    &resolution,
    format,
    behavior.quiet,
    colors,
    &mut io::stdout(),
    &mut io::stderr(),
  )?;

  let header = generate_header(&prepared.environment, &options, Utc::now())?;
  let report = HookReport {
    resolution,
    header,
    dry_run,
  };
  report_header(&report, format, behavior.quiet, colors, &mut io::stdout())
}

/// First half of the output, written before the header step.
fn report_resolution(
  resolution: &Resolution,
  format: OutputFormat,
  quiet: bool,
  colors: &ColorScheme,
  out: &mut dyn Write,
  err: &mut dyn Write,
) -> Result<()> {
  match format {
    OutputFormat::Text | OutputFormat::Env => print_resolution(resolution, format, quiet, colors, out, err)?,
    // JSON goes out as one document at the end; keep the build log informed.
    OutputFormat::Json if !quiet => writeln!(err, "{}", styled_summary(resolution, colors))?,
    OutputFormat::Json => {}
  }
  Ok(())
}

/// Second half of the output, once the header step has finished.
fn report_header(
  report: &HookReport,
  format: OutputFormat,
  quiet: bool,
  colors: &ColorScheme,
  out: &mut dyn Write,
) -> Result<()> {
  let header = &report.header;

  match format {
    OutputFormat::Text => {
      if quiet {
        return Ok(());
      }
      if report.dry_run {
        writeln!(
          out,
          "{} {}",
          colors.warning("⚠"),
          colors.warning("DRY RUN: version header not written")
        )?;
      }
      writeln!(
        out,
        "{}",
        describe_outcome(header.outcome, &header.path, &header.header.version, colors)
      )?;
    }
    OutputFormat::Env => {
      writeln!(out, "VERSION_HEADER={}", header.path.display())?;
      writeln!(out, "FW_VERSION={}", header.header.version)?;
      writeln!(out, "FW_BUILD_UTC={}", header.header.build_timestamp)?;
    }
    OutputFormat::Json => {
      writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    }
  }

  Ok(())
}
