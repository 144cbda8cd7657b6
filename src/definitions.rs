//! Compile-time symbol definitions.
//!
//! Build systems hand definitions to the compiler as a mix of bare names
//! (`-DDEBUG`) and name/value pairs (`-DRAYZ_VERSION="1.2.0"`). Each entry is
//! kept as a tagged [`Definition`] so lookups never have to guess which shape
//! they are looking at.

use std::str::FromStr;

/// A single preprocessor definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
  /// A symbol defined without a value (`-DNAME`).
  NameOnly(String),
  /// A symbol defined with a value (`-DNAME=VALUE`).
  NameValue(String, String),
}

impl Definition {
  /// The symbol name regardless of shape.
  pub fn name(&self) -> &str {
    match self {
      Definition::NameOnly(name) | Definition::NameValue(name, _) => name,
    }
  }
}

impl FromStr for Definition {
  type Err = String;

  /// Parse `NAME` or `NAME=VALUE`. A leading `-D` is accepted and ignored so
  /// raw compiler flags can be passed straight through.
  fn from_str(input: &str) -> Result<Self, Self::Err> {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix("-D").unwrap_or(trimmed).trim_start();

    let (name, value) = match body.split_once('=') {
      Some((name, value)) => (name.trim(), Some(value)),
      None => (body, None),
    };

    if name.is_empty() {
      return Err(format!("Invalid definition '{input}': missing symbol name"));
    }

    if name.chars().any(char::is_whitespace) {
      return Err(format!("Invalid definition '{input}': symbol name contains whitespace"));
    }

    Ok(match value {
      Some(value) => Definition::NameValue(name.to_string(), value.to_string()),
      None => Definition::NameOnly(name.to_string()),
    })
  }
}

/// Ordered collection of definitions for one build environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileDefinitions {
  entries: Vec<Definition>,
}

impl CompileDefinitions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a definition. Later entries shadow earlier ones with the same name.
  pub fn push(&mut self, definition: Definition) {
    self.entries.push(definition);
  }

  /// Extend with definitions from another collection, preserving order.
  pub fn extend<I: IntoIterator<Item = Definition>>(&mut self, definitions: I) {
    self.entries.extend(definitions);
  }

  /// Find the effective definition for `name`.
  ///
  /// Scans every entry and keeps the last match, the same way a compiler
  /// treats repeated `-D` flags.
  pub fn lookup(&self, name: &str) -> Option<&Definition> {
    self.entries.iter().rfind(|definition| definition.name() == name)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Definition> {
    self.entries.iter()
  }

  /// Collect `-D` definitions out of a PlatformIO style `build_flags` value.
  ///
  /// Accepts `-DNAME`, `-DNAME=VALUE` and the split form `-D NAME`. Any other
  /// flag (`-Os`, `-Wall`, `-I include`) is skipped.
  pub fn from_build_flags(flags: &str) -> Self {
    let mut definitions = Self::new();
    let mut tokens = split_flags(flags).into_iter();

    while let Some(token) = tokens.next() {
      let candidate = if token == "-D" {
        match tokens.next() {
          Some(next) => next,
          None => break,
        }
      } else if let Some(rest) = token.strip_prefix("-D") {
        rest.to_string()
      } else {
        continue;
      };

      match candidate.parse::<Definition>() {
        Ok(definition) => definitions.push(definition),
        Err(err) => tracing::warn!("Skipping build flag: {err}"),
      }
    }

    definitions
  }
}

impl FromIterator<Definition> for CompileDefinitions {
  fn from_iter<T: IntoIterator<Item = Definition>>(iter: T) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

/// Split a flag string on whitespace while keeping quoted runs together.
///
/// Quotes are preserved in the output (including backslash-escaped ones) so
/// that later stages can decide how much quoting to strip.
fn split_flags(input: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  let mut current = String::new();
  let mut quote: Option<char> = None;
  let mut chars = input.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '\\' => {
        current.push(ch);
        if let Some(next) = chars.next() {
          current.push(next);
        }
      }
      '"' | '\'' => {
        match quote {
          Some(open) if open == ch => quote = None,
          None => quote = Some(ch),
          Some(_) => {}
        }
        current.push(ch);
      }
      c if c.is_whitespace() && quote.is_none() => {
        if !current.is_empty() {
          tokens.push(std::mem::take(&mut current));
        }
      }
      c => current.push(c),
    }
  }

  if !current.is_empty() {
    tokens.push(current);
  }

  tokens
}
