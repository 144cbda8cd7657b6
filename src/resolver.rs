//! Source directory selection.
//!
//! A firmware project can hold several variants side by side (`target/src`,
//! `weapon/src`, ...). The resolver picks the one matching the active build
//! environment and writes it back into the [`BuildEnvironment`].
//!
//! Priority, first match wins:
//! 1. an explicit `custom_src_dir` override, relative to the project root
//! 2. the first [`VariantRule`] whose marker occurs in the environment name
//! 3. nothing: the existing source directory is left untouched

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::environment::BuildEnvironment;

/// Maps an environment-name marker to a variant source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRule {
  /// Substring looked for in the environment name (case-sensitive).
  pub marker: String,
  /// Source directory relative to the project root.
  pub dir: PathBuf,
}

impl VariantRule {
  pub fn new(marker: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
    Self {
      marker: marker.into(),
      dir: dir.into(),
    }
  }
}

/// Ordered set of variant rules. Earlier rules win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
  rules: Vec<VariantRule>,
}

impl SourceLayout {
  pub fn new(rules: Vec<VariantRule>) -> Self {
    Self { rules }
  }

  fn match_rule(&self, env_name: &str) -> Option<&VariantRule> {
    self.rules.iter().find(|rule| env_name.contains(rule.marker.as_str()))
  }
}

impl Default for SourceLayout {
  fn default() -> Self {
    Self::new(vec![
      VariantRule::new("target", Path::new("target").join("src")),
      VariantRule::new("weapon", Path::new("weapon").join("src")),
    ])
  }
}

/// Why a particular source directory was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSelection {
  /// `custom_src_dir` was configured.
  Override { path: String },
  /// The environment name contained a variant marker.
  Variant { marker: String },
  /// No rule applied; the existing directory stays.
  Unchanged,
}

/// Outcome of a resolver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
  pub environment: String,
  pub selection: SourceSelection,
  pub src_dir: PathBuf,
}

impl Resolution {
  /// The line the hook reports to the build log.
  pub fn summary(&self) -> String {
    format!(
      "[{}] Source Directory set to: {}",
      self.environment,
      self.src_dir.display()
    )
  }
}

/// Pick the source directory for `env_name` without touching any state.
///
/// Returns `None` when no override is given and no rule matches. An empty
/// override counts as absent.
pub fn select_source_dir(
  project_dir: &Path,
  env_name: &str,
  override_dir: Option<&str>,
  layout: &SourceLayout,
) -> Option<(SourceSelection, PathBuf)> {
  if let Some(custom) = override_dir.filter(|custom| !custom.is_empty()) {
    return Some((
      SourceSelection::Override {
        path: custom.to_string(),
      },
      project_dir.join(custom),
    ));
  }

  layout.match_rule(env_name).map(|rule| {
    (
      SourceSelection::Variant {
        marker: rule.marker.clone(),
      },
      project_dir.join(&rule.dir),
    )
  })
}

/// Resolve the effective source directory and store it in `env`.
///
/// Never fails: an environment name that matches nothing keeps the
/// directory the host build system already had.
pub fn resolve_source_dir(
  env: &mut BuildEnvironment,
  override_dir: Option<&str>,
  layout: &SourceLayout,
) -> Resolution {
  let selection = match select_source_dir(env.project_dir(), env.name(), override_dir, layout) {
    Some((selection, dir)) => {
      debug!(?selection, "Source directory rule matched");
      env.set_src_dir(dir);
      selection
    }
    None => {
      debug!(environment = env.name(), "No source directory rule matched");
      SourceSelection::Unchanged
    }
  };

  let resolution = Resolution {
    environment: env.name().to_string(),
    selection,
    src_dir: env.src_dir().to_path_buf(),
  };

  info!("{}", resolution.summary());
  resolution
}
