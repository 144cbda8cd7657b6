//! Command-line interface definitions for fw-prebuild.
//!
//! This module defines the CLI structure using clap derives. Every option
//! that a host build system would pass can also come from an environment
//! variable, so the hook can be wired into PlatformIO, Make or CMake without
//! argument plumbing.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::handle_completions_command;
use crate::commands::header::handle_header_command;
use crate::commands::run::handle_run_command;
use crate::commands::src_dir::handle_src_dir_command;
use crate::commands::version::handle_version_command;
use crate::definitions::Definition;
use crate::hook::HookOptions;
use crate::resolver::{SourceLayout, VariantRule};
use crate::version_header::{DEFAULT_HEADER_NAME, DEFAULT_INCLUDE_DIR, DEFAULT_VERSION_SYMBOL, HeaderOptions};

/// fw-prebuild - Pre-build hook for multi-target firmware projects
#[derive(Debug, Parser)]
#[command(
  name = "fw-prebuild",
  version,
  about = "Select firmware sources and stamp a version header before compiling",
  long_about = "A pre-build hook for multi-target firmware projects.\n\
                Picks the source directory for the active build environment and regenerates\n\
                include/version.h only when its content changes.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Run the full hook: resolve the source directory, then generate the header
  Run {
    #[command(flatten)]
    project: ProjectArgs,

    #[command(flatten)]
    header: HeaderArgs,

    /// How to report the result on stdout
    #[arg(long, value_enum, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Resolve and render without writing anything
    #[arg(long)]
    dry_run: bool,
  },

  /// Resolve and print the effective source directory only
  SrcDir {
    #[command(flatten)]
    project: ProjectArgs,

    /// How to report the result on stdout
    #[arg(long, value_enum, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,
  },

  /// Generate the version header only
  Header {
    #[command(flatten)]
    project: ProjectArgs,

    #[command(flatten)]
    header: HeaderArgs,

    /// Print the rendered header to stdout instead of writing it
    #[arg(long)]
    print: bool,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Inputs describing the project and the active build environment
#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
  /// Project root directory
  #[arg(long, env = "FW_PREBUILD_PROJECT_DIR", default_value = ".", value_name = "DIR")]
  pub project_dir: PathBuf,

  /// Project configuration file (defaults to <project-dir>/platformio.ini)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Active build environment name (blank falls back to `default_envs`)
  #[arg(short, long = "env", env = "PIOENV", value_name = "NAME")]
  pub env_name: Option<String>,

  /// Source directory the build starts from (defaults to <project-dir>/src)
  #[arg(long, env = "PROJECT_SRC_DIR", value_name = "DIR")]
  pub src_dir: Option<PathBuf>,

  /// Custom source directory, relative to the project root
  #[arg(long, value_name = "DIR")]
  pub custom_src_dir: Option<String>,

  /// Compile definition, repeatable
  #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]", value_parser = parse_definition)]
  pub definitions: Vec<Definition>,

  /// Variant rule mapping an environment-name marker to a source directory,
  /// repeatable (replaces the built-in target/weapon rules)
  #[arg(long = "variant", value_name = "MARKER=DIR", value_parser = parse_variant_rule)]
  pub variants: Vec<VariantRule>,
}

impl ProjectArgs {
  /// Location of the project configuration file.
  pub fn config_path(&self) -> PathBuf {
    self
      .config
      .clone()
      .unwrap_or_else(|| self.project_dir.join(crate::project::DEFAULT_PROJECT_FILE))
  }

  /// Variant rules in effect.
  pub fn layout(&self) -> SourceLayout {
    if self.variants.is_empty() {
      SourceLayout::default()
    } else {
      SourceLayout::new(self.variants.clone())
    }
  }
}

/// Version header options
#[derive(Debug, Clone, Args)]
pub struct HeaderArgs {
  /// Compile definition that carries the firmware version
  #[arg(long, default_value = DEFAULT_VERSION_SYMBOL, value_name = "SYMBOL")]
  pub version_symbol: String,

  /// Include directory, relative to the project root
  #[arg(long, default_value = DEFAULT_INCLUDE_DIR, value_name = "DIR")]
  pub include_dir: PathBuf,

  /// Header file name
  #[arg(long, default_value = DEFAULT_HEADER_NAME, value_name = "FILE")]
  pub header_name: String,
}

impl From<&HeaderArgs> for HeaderOptions {
  fn from(args: &HeaderArgs) -> Self {
    HeaderOptions {
      version_symbol: args.version_symbol.clone(),
      include_dir: args.include_dir.clone(),
      header_name: args.header_name.clone(),
    }
  }
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Result formats for stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
  /// Human-readable summary
  #[default]
  Text,
  /// `KEY=value` lines for shell consumption
  Env,
  /// A JSON document
  Json,
}

/// Shells supported by the completions subcommand
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Parse a `-D NAME[=VALUE]` argument
fn parse_definition(value: &str) -> Result<Definition, String> {
  value.parse()
}

/// Parse a `--variant MARKER=DIR` argument
fn parse_variant_rule(value: &str) -> Result<VariantRule, String> {
  let (marker, dir) = value
    .split_once('=')
    .ok_or_else(|| format!("Invalid variant '{value}': expected MARKER=DIR"))?;

  let marker = marker.trim();
  let dir = dir.trim();
  if marker.is_empty() || dir.is_empty() {
    return Err(format!("Invalid variant '{value}': marker and directory must not be empty"));
  }

  Ok(VariantRule::new(marker, dir))
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    let (project, header) = match &self.command {
      Command::Run { project, header, .. } | Command::Header { project, header, .. } => (project, Some(header)),
      Command::SrcDir { project, .. } => (project, None),
      Command::Version { .. } | Command::Completions { .. } => return Ok(()),
    };

    if let Some(custom) = &project.custom_src_dir
      && custom.trim().is_empty()
    {
      return Err("--custom-src-dir must not be empty".to_string());
    }

    if let Some(header) = header {
      if header.version_symbol.trim().is_empty() {
        return Err("--version-symbol must not be empty".to_string());
      }
      if header.header_name.trim().is_empty() || header.header_name.contains(['/', '\\']) {
        return Err("--header-name must be a plain file name".to_string());
      }
    }

    Ok(())
  }
}

/// Build [`HookOptions`] from parsed arguments.
///
/// The project directory is made absolute so every path reported back to the
/// build system is absolute too.
pub fn hook_options(project: &ProjectArgs, header: Option<&HeaderArgs>, dry_run: bool) -> anyhow::Result<HookOptions> {
  use anyhow::Context;

  let project_dir = std::path::absolute(&project.project_dir)
    .with_context(|| format!("Invalid project directory {}", project.project_dir.display()))?;

  Ok(HookOptions {
    project_dir,
    env_name: project.env_name.clone(),
    src_dir: project.src_dir.clone(),
    custom_src_dir: project.custom_src_dir.clone(),
    definitions: project.definitions.clone(),
    layout: project.layout(),
    header: header.map(HeaderOptions::from).unwrap_or_default(),
    dry_run,
  })
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Run {
      project,
      header,
      format,
      dry_run,
    } => {
      handle_run_command(project, header, *format, *dry_run, &cli.behavior, &colors);
    }
    Command::SrcDir { project, format } => {
      handle_src_dir_command(project, *format, &cli.behavior, &colors);
    }
    Command::Header { project, header, print } => {
      handle_header_command(project, header, *print, &cli.behavior, &colors);
    }
    Command::Version { json, short } => {
      handle_version_command(*json, *short, &colors);
    }
    Command::Completions { shell } => {
      handle_completions_command(*shell);
    }
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;

  fn project_args() -> ProjectArgs {
    ProjectArgs {
      project_dir: PathBuf::from("."),
      config: None,
      env_name: Some("esp32_target".to_string()),
      src_dir: None,
      custom_src_dir: None,
      definitions: vec![],
      variants: vec![],
    }
  }

  fn header_args() -> HeaderArgs {
    HeaderArgs {
      version_symbol: DEFAULT_VERSION_SYMBOL.to_string(),
      include_dir: PathBuf::from(DEFAULT_INCLUDE_DIR),
      header_name: DEFAULT_HEADER_NAME.to_string(),
    }
  }

  fn behavior() -> BehaviorOptions {
    BehaviorOptions {
      verbose: 0,
      quiet: false,
      color: ColorOption::Auto,
    }
  }

  #[test]
  fn test_cli_parse_run_with_definitions() {
    let cli = Cli::try_parse_from([
      "fw-prebuild",
      "run",
      "--project-dir",
      "/work/fw",
      "--env",
      "esp32_weapon",
      "-D",
      "RAYZ_VERSION=\"2.3.1\"",
      "-DDEBUG",
      "--format",
      "json",
    ])
    .unwrap();

    let Command::Run { project, format, .. } = cli.command else {
      panic!("expected run command");
    };
    assert_eq!(format, OutputFormat::Json);
    assert_eq!(project.project_dir, PathBuf::from("/work/fw"));
    assert_eq!(project.env_name.as_deref(), Some("esp32_weapon"));
    assert_eq!(
      project.definitions,
      vec![
        Definition::NameValue("RAYZ_VERSION".into(), "\"2.3.1\"".into()),
        Definition::NameOnly("DEBUG".into()),
      ]
    );
  }

  #[test]
  fn test_cli_rejects_malformed_definition() {
    let result = Cli::try_parse_from(["fw-prebuild", "run", "--env", "x", "-D", "=1"]);
    assert!(result.is_err());
  }

  #[test]
  fn test_cli_parse_variants() {
    let cli = Cli::try_parse_from([
      "fw-prebuild",
      "src-dir",
      "--env",
      "esp32_base",
      "--variant",
      "base=base_station/src",
    ])
    .unwrap();

    let Command::SrcDir { project, .. } = cli.command else {
      panic!("expected src-dir command");
    };
    assert_eq!(
      project.layout(),
      SourceLayout::new(vec![VariantRule::new("base", "base_station/src")])
    );
  }

  #[test]
  fn test_parse_variant_rule_errors() {
    assert!(parse_variant_rule("base").is_err());
    assert!(parse_variant_rule("=dir").is_err());
    assert!(parse_variant_rule("base=").is_err());
  }

  #[test]
  fn test_default_layout_without_variants() {
    assert_eq!(project_args().layout(), SourceLayout::default());
  }

  #[test]
  fn test_config_path_defaults_to_platformio_ini() {
    let mut args = project_args();
    args.project_dir = PathBuf::from("/work/fw");
    assert_eq!(args.config_path(), Path::new("/work/fw/platformio.ini"));

    args.config = Some(PathBuf::from("/etc/custom.ini"));
    assert_eq!(args.config_path(), Path::new("/etc/custom.ini"));
  }

  #[test]
  fn test_cli_validation_leaves_blank_env_to_default_envs() {
    let mut project = project_args();
    project.env_name = Some("   ".to_string());
    let cli = Cli {
      command: Command::SrcDir {
        project,
        format: OutputFormat::Text,
      },
      behavior: behavior(),
    };

    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_cli_validation_rejects_empty_custom_src_dir() {
    let mut project = project_args();
    project.custom_src_dir = Some(" ".to_string());
    let cli = Cli {
      command: Command::SrcDir {
        project,
        format: OutputFormat::Text,
      },
      behavior: behavior(),
    };

    assert!(cli.validate().unwrap_err().contains("--custom-src-dir"));
  }

  #[test]
  fn test_cli_validation_rejects_header_path() {
    let mut header = header_args();
    header.header_name = "gen/version.h".to_string();
    let cli = Cli {
      command: Command::Header {
        project: project_args(),
        header,
        print: false,
      },
      behavior: behavior(),
    };

    assert!(cli.validate().unwrap_err().contains("--header-name"));
  }

  #[test]
  fn test_cli_validation_command_succeeds() {
    let cli = Cli {
      command: Command::Run {
        project: project_args(),
        header: header_args(),
        format: OutputFormat::Text,
        dry_run: false,
      },
      behavior: behavior(),
    };
    assert!(cli.validate().is_ok());

    let cli = Cli {
      command: Command::Version {
        json: false,
        short: true,
      },
      behavior: behavior(),
    };
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_hook_options_makes_project_dir_absolute() {
    let options = hook_options(&project_args(), Some(&header_args()), true).unwrap();
    assert!(options.project_dir.is_absolute());
    assert!(options.dry_run);
    assert_eq!(options.env_name.as_deref(), Some("esp32_target"));
    assert_eq!(options.header, HeaderOptions::default());
  }

  #[test]
  fn test_global_verbosity_after_subcommand() {
    let cli = Cli::try_parse_from(["fw-prebuild", "src-dir", "--env", "weapon", "-vv"]).unwrap();
    assert_eq!(cli.behavior.verbose, 2);
  }
}
