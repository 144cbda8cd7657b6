//! Test fixtures for firmware project trees
//!
//! Builds throwaway project directories shaped like a real multi-target
//! firmware repository so hook runs can be exercised end to end.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Project file with shared flags, per-variant environments and a bench
/// environment that uses a custom source directory.
pub const SAMPLE_PLATFORMIO_INI: &str = r#"
; PlatformIO Project Configuration File
[platformio]
default_envs = esp32_target

[env]
platform = espressif32
framework = arduino
monitor_speed = 115200
build_flags =
  -Os
  -DCORE_DEBUG_LEVEL=3
  -DRAYZ_VERSION=\"2.3.1\"

[env:esp32_target]
board = esp32dev

[env:esp32_weapon]
board = esp32-c3-devkitm-1
build_flags =
  -Os
  -DRAYZ_VERSION

[env:lab_bench]
board = esp32dev
custom_src_dir = bench/src
build_flags = -Os
"#;

/// A temporary firmware project.
pub struct TempProject {
  dir: TempDir,
}

impl TempProject {
  /// Empty project directory.
  pub fn empty() -> Self {
    Self {
      dir: tempfile::tempdir().unwrap(),
    }
  }

  /// Project with [`SAMPLE_PLATFORMIO_INI`] and the usual variant folders.
  pub fn sample() -> Self {
    let project = Self::empty();
    project.write("platformio.ini", SAMPLE_PLATFORMIO_INI);
    for dir in ["src", "target/src", "weapon/src", "bench/src"] {
      fs::create_dir_all(project.path().join(dir)).unwrap();
    }
    project.write("target/src/main.cpp", "void setup() {}\nvoid loop() {}\n");
    project
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  pub fn write(&self, relative: &str, content: &str) {
    let path = self.path().join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
  }

  pub fn header_path(&self) -> PathBuf {
    self.path().join("include").join("version.h")
  }

  pub fn read_header(&self) -> String {
    fs::read_to_string(self.header_path()).unwrap()
  }
}
