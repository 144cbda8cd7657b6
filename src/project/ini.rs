//! `platformio.ini` reader.
//!
//! Supports the subset of the INI dialect the hook relies on: `[section]`
//! headers, `key = value` and `key: value` options, `;` and `#` comments
//! (whole-line or inline after whitespace), and indented continuation lines
//! that extend the previous option (the usual way multi-line `build_flags`
//! are written).

use std::path::Path;

use super::{ConfigError, ProjectOptions};

/// File name looked up in the project root when no path is given.
pub const DEFAULT_PROJECT_FILE: &str = "platformio.ini";

const PLATFORMIO_SECTION: &str = "platformio";
const SHARED_ENV_SECTION: &str = "env";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
  name: String,
  options: Vec<(String, String)>,
}

impl Section {
  fn get(&self, key: &str) -> Option<&str> {
    self
      .options
      .iter()
      .rev()
      .find(|(name, _)| name == key)
      .map(|(_, value)| value.as_str())
  }
}

/// Parsed project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
  sections: Vec<Section>,
}

impl ProjectConfig {
  /// Read and parse the project file at `path`.
  ///
  /// A missing file yields an empty configuration, since projects without
  /// a `platformio.ini` simply have no options.
  ///
  /// # Errors
  /// Returns [`ConfigError::Io`] when the file exists but cannot be read and
  /// [`ConfigError::Parse`] when its contents are malformed.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      tracing::debug!("No project file at {}", path.display());
      return Ok(Self::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let config = Self::parse(&content)?;
    tracing::debug!(
      "Loaded {} section(s) from {}",
      config.sections.len(),
      path.display()
    );
    Ok(config)
  }

  /// Parse INI text.
  pub fn parse(content: &str) -> Result<Self, ConfigError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut last_key: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
      let line_no = index + 1;
      let trimmed = raw.trim();

      if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
        continue;
      }

      let indented = raw.starts_with(char::is_whitespace);

      if indented && let Some(key) = &last_key {
        let section = sections.last_mut().ok_or_else(|| parse_error(line_no, "continuation outside of a section"))?;
        let value = strip_inline_comment(trimmed);
        if let Some((_, existing)) = section.options.iter_mut().rev().find(|(name, _)| name == key) {
          if existing.is_empty() {
            existing.push_str(value);
          } else {
            existing.push('\n');
            existing.push_str(value);
          }
        }
        continue;
      }

      if let Some(header) = trimmed.strip_prefix('[') {
        let name = header
          .strip_suffix(']')
          .ok_or_else(|| parse_error(line_no, "unterminated section header"))?
          .trim();
        if name.is_empty() {
          return Err(parse_error(line_no, "empty section name"));
        }
        sections.push(Section {
          name: name.to_string(),
          options: Vec::new(),
        });
        last_key = None;
        continue;
      }

      let Some((key, value)) = split_option(trimmed) else {
        return Err(parse_error(line_no, &format!("expected `key = value`, found `{trimmed}`")));
      };

      let key = key.trim();
      if key.is_empty() {
        return Err(parse_error(line_no, "option without a name"));
      }

      let section = sections
        .last_mut()
        .ok_or_else(|| parse_error(line_no, &format!("option `{key}` appears before any section")))?;
      section
        .options
        .push((key.to_string(), strip_inline_comment(value.trim()).to_string()));
      last_key = Some(key.to_string());
    }

    Ok(Self { sections })
  }

  /// Raw option lookup. Later duplicates of a section or key win.
  pub fn get(&self, section: &str, key: &str) -> Option<&str> {
    self
      .sections
      .iter()
      .rev()
      .filter(|candidate| candidate.name == section)
      .find_map(|candidate| candidate.get(key))
  }
}

impl ProjectOptions for ProjectConfig {
  fn env_option(&self, env_name: &str, key: &str) -> Option<String> {
    self
      .get(&format!("{SHARED_ENV_SECTION}:{env_name}"), key)
      .or_else(|| self.get(SHARED_ENV_SECTION, key))
      .map(str::to_string)
  }

  fn default_envs(&self) -> Vec<String> {
    self
      .get(PLATFORMIO_SECTION, "default_envs")
      .map(|value| {
        value
          .split([',', '\n'])
          .map(str::trim)
          .filter(|name| !name.is_empty())
          .map(str::to_string)
          .collect()
      })
      .unwrap_or_default()
  }
}

/// Split an option line on whichever of `=` or `:` comes first.
fn split_option(line: &str) -> Option<(&str, &str)> {
  let index = line.find(['=', ':'])?;
  Some((&line[..index], &line[index + 1..]))
}

/// Drop a trailing `; comment` or `# comment`. Only a marker preceded by
/// whitespace starts a comment, so values such as `a;b` survive.
fn strip_inline_comment(value: &str) -> &str {
  let bytes = value.as_bytes();
  for (index, byte) in bytes.iter().enumerate() {
    if matches!(byte, b';' | b'#') && index > 0 && bytes[index - 1].is_ascii_whitespace() {
      return value[..index].trim_end();
    }
  }
  value
}

fn parse_error(line: usize, message: &str) -> ConfigError {
  ConfigError::Parse {
    line,
    message: message.to_string(),
  }
}
