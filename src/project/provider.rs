//! Project option lookup abstraction.
//!
//! The hook only needs a handful of per-environment options. Keeping the
//! lookup behind [`ProjectOptions`] lets callers feed options from an INI
//! file, from a host build system, or from a fixed map in tests.

use std::collections::HashMap;

/// Source of per-environment project options.
pub trait ProjectOptions {
  /// Look up `key` for the environment `env_name`.
  ///
  /// # Returns
  /// * `Some(value)` when the option is set for the environment or inherited
  ///   from shared settings.
  /// * `None` when the option is not configured.
  fn env_option(&self, env_name: &str, key: &str) -> Option<String>;

  /// Environments built when none is named explicitly, in declaration order.
  fn default_envs(&self) -> Vec<String> {
    Vec::new()
  }
}

/// Options that apply to every environment.
impl ProjectOptions for HashMap<String, String> {
  fn env_option(&self, _env_name: &str, key: &str) -> Option<String> {
    self.get(key).cloned()
  }
}
