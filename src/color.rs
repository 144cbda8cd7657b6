//! Color utilities for terminal output
//!
//! Build logs are often captured to files, so styling is opt-in through
//! `--color` and falls back to plain text whenever stdout is not a terminal.

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Semantic color palette for CLI output.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Create a new color scheme based on user preference and terminal
  /// capabilities
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => {
        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
      }
    };

    Self { enabled }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: std::fmt::Display>(&self, text: T, style: impl FnOnce(&T) -> String) -> String {
    if self.enabled { style(&text) } else { text.to_string() }
  }

  /// Style for success markers (green)
  pub fn success<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.green().to_string())
  }

  /// Style for error messages (bright red)
  pub fn error<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_red().bold().to_string())
  }

  /// Style for warnings such as dry-run notices (yellow)
  pub fn warning<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.yellow().to_string())
  }

  /// Style for labels and environment names (bright white, bold)
  pub fn emphasis<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_white().bold().to_string())
  }

  /// Style for file paths (magenta)
  pub fn path<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.magenta().to_string())
  }

  /// Style for versions and counts (bright blue)
  pub fn number<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_blue().to_string())
  }

  /// Style for hashes and identifiers (bright green)
  pub fn code<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_green().to_string())
  }

  /// Style for secondary text (gray)
  pub fn dimmed<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.dimmed().to_string())
  }
}
