//! fw-prebuild - Pre-build hook for multi-target firmware projects
//!
//! This is the main entry point for the CLI application.

fn main() {
  fw_prebuild::cli::run();
}
