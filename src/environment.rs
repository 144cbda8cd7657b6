//! The explicit build-environment object the hook reads from and writes to.
//!
//! Host build systems usually expose this state as ambient globals. Here it
//! is an ordinary value passed by `&mut` into the resolver so every mutation
//! is visible at the call site.

use std::path::{Path, PathBuf};

use crate::definitions::CompileDefinitions;

/// Directory, relative to the project root, that builds compile by default.
pub const DEFAULT_SRC_DIR: &str = "src";

/// Configuration for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
  name: String,
  project_dir: PathBuf,
  src_dir: PathBuf,
  definitions: CompileDefinitions,
}

impl BuildEnvironment {
  /// Create an environment whose source directory starts at
  /// `<project_dir>/src`.
  pub fn new(name: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
    let project_dir = project_dir.into();
    let src_dir = project_dir.join(DEFAULT_SRC_DIR);
    Self {
      name: name.into(),
      project_dir,
      src_dir,
      definitions: CompileDefinitions::new(),
    }
  }

  /// Replace the default source directory the host build system starts with.
  pub fn with_src_dir(mut self, src_dir: impl Into<PathBuf>) -> Self {
    self.src_dir = src_dir.into();
    self
  }

  pub fn with_definitions(mut self, definitions: CompileDefinitions) -> Self {
    self.definitions = definitions;
    self
  }

  /// Name of the active build environment (e.g. `esp32_target`).
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn project_dir(&self) -> &Path {
    &self.project_dir
  }

  /// The source directory the host build system will compile.
  pub fn src_dir(&self) -> &Path {
    &self.src_dir
  }

  pub fn definitions(&self) -> &CompileDefinitions {
    &self.definitions
  }

  pub(crate) fn set_src_dir(&mut self, src_dir: PathBuf) {
    self.src_dir = src_dir;
  }
}
