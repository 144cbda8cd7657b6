//! Errors raised while loading project configuration.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while reading the project file.
#[derive(Debug)]
pub enum ConfigError {
  /// A line could not be understood as a section, option or continuation.
  Parse { line: usize, message: String },
  /// The project file exists but could not be read.
  Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Parse { line, message } => write!(f, "failed to parse project file (line {line}): {message}"),
      Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::error::Error;
  use std::io;

  use super::*;

  #[test]
  fn test_io_error_keeps_path_and_source() {
    let error = ConfigError::Io {
      path: PathBuf::from("/proj/platformio.ini"),
      source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };

    assert_eq!(error.to_string(), "failed to read /proj/platformio.ini: denied");
    assert!(error.source().is_some());
  }

  #[test]
  fn test_parse_error_has_no_source() {
    let error = ConfigError::Parse {
      line: 3,
      message: "empty section name".to_string(),
    };

    assert_eq!(error.to_string(), "failed to parse project file (line 3): empty section name");
    assert!(error.source().is_none());
  }
}
