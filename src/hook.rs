//! The pre-build hook: source directory selection followed by version header
//! generation.
//!
//! The two steps are independent. The resolver only looks at the environment
//! name and the override; the generator only looks at compile definitions and
//! the filesystem. They run in that order so the host build system sees the
//! effective source directory before anything touches the disk.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::definitions::{CompileDefinitions, Definition};
use crate::environment::BuildEnvironment;
use crate::project::{BUILD_FLAGS_OPTION, CUSTOM_SRC_DIR_OPTION, ProjectOptions};
use crate::resolver::{Resolution, SourceLayout, resolve_source_dir};
use crate::version_header::{HeaderOptions, HeaderReport, generate_version_header, preview_version_header};

/// Inputs for one hook invocation, as supplied by the host build system.
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
  pub project_dir: PathBuf,
  /// Active environment. Falls back to the project's first `default_envs`.
  pub env_name: Option<String>,
  /// Source directory the host starts from. Defaults to `<project>/src`.
  pub src_dir: Option<PathBuf>,
  /// Explicit override; takes precedence over `custom_src_dir` in the
  /// project file.
  pub custom_src_dir: Option<String>,
  /// Definitions appended after the environment's `build_flags`.
  pub definitions: Vec<Definition>,
  pub layout: SourceLayout,
  pub header: HeaderOptions,
  /// Resolve and render without writing the header.
  pub dry_run: bool,
}

/// Raised when no environment is named and the project declares no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingEnvironment;

impl fmt::Display for MissingEnvironment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "no build environment given; pass --env, set PIOENV, or declare default_envs in the project file"
    )
  }
}

impl std::error::Error for MissingEnvironment {}

/// A build environment ready for the resolver, plus the override to apply.
#[derive(Debug, Clone)]
pub struct PreparedEnvironment {
  pub environment: BuildEnvironment,
  pub override_dir: Option<String>,
}

/// Result of a full hook run.
#[derive(Debug, Clone, Serialize)]
pub struct HookReport {
  pub resolution: Resolution,
  pub header: HeaderReport,
  pub dry_run: bool,
}

/// Assemble the [`BuildEnvironment`] from explicit options and project
/// configuration.
///
/// # Errors
/// Returns [`MissingEnvironment`] when no environment name can be determined.
pub fn prepare_environment(options: &HookOptions, project: &dyn ProjectOptions) -> Result<PreparedEnvironment> {
  let env_name = options
    .env_name
    .clone()
    .filter(|name| !name.trim().is_empty())
    .or_else(|| project.default_envs().into_iter().next())
    .ok_or(MissingEnvironment)?;

  let mut definitions = project
    .env_option(&env_name, BUILD_FLAGS_OPTION)
    .map(|flags| CompileDefinitions::from_build_flags(&flags))
    .unwrap_or_default();
  definitions.extend(options.definitions.iter().cloned());

  debug!(
    environment = %env_name,
    definitions = definitions.len(),
    "Prepared build environment"
  );

  let mut environment = BuildEnvironment::new(&env_name, &options.project_dir).with_definitions(definitions);
  if let Some(src_dir) = &options.src_dir {
    environment = environment.with_src_dir(options.project_dir.join(src_dir));
  }

  let override_dir = options
    .custom_src_dir
    .clone()
    .or_else(|| project.env_option(&env_name, CUSTOM_SRC_DIR_OPTION));

  Ok(PreparedEnvironment {
    environment,
    override_dir,
  })
}

/// Run the version header step against a prepared environment.
pub fn generate_header(environment: &BuildEnvironment, options: &HookOptions, now: DateTime<Utc>) -> Result<HeaderReport> {
  if options.dry_run {
    preview_version_header(environment.project_dir(), environment.definitions(), &options.header, now)
  } else {
    generate_version_header(environment.project_dir(), environment.definitions(), &options.header, now)
  }
}

/// Run both hook steps.
///
/// # Errors
/// Propagates [`MissingEnvironment`] and any filesystem failure from header
/// generation. An environment that matches no source rule is not an error.
pub fn run_hook(options: &HookOptions, project: &dyn ProjectOptions, now: DateTime<Utc>) -> Result<HookReport> {
  let PreparedEnvironment {
    mut environment,
    override_dir,
  } = prepare_environment(options, project)?;

  let resolution = resolve_source_dir(&mut environment, override_dir.as_deref(), &options.layout);
  let header = generate_header(&environment, options, now)?;

  Ok(HookReport {
    resolution,
    header,
    dry_run: options.dry_run,
  })
}
