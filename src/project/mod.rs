//! Project-level configuration.
//!
//! Options such as `custom_src_dir` and `build_flags` live in the project's
//! `platformio.ini`:
//! ```text
//! [env]
//! build_flags = -DRAYZ_VERSION=\"2.3.1\"
//!
//! [env:esp32_bench]
//! custom_src_dir = bench/src
//! ```
//!
//! Options in `[env:<name>]` override the shared `[env]` section.

mod ini;
mod provider;
mod types;

pub use ini::{DEFAULT_PROJECT_FILE, ProjectConfig};
pub use provider::ProjectOptions;
pub use types::ConfigError;

/// Option naming a source directory that overrides name-based selection.
pub const CUSTOM_SRC_DIR_OPTION: &str = "custom_src_dir";
/// Option holding the compiler flags for an environment.
pub const BUILD_FLAGS_OPTION: &str = "build_flags";
