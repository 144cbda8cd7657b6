//! `completions` subcommand.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate};

use crate::cli::{Cli, Shell};

/// Print a completion script for `shell` to stdout.
pub(crate) fn handle_completions_command(shell: Shell) {
  write_completions(shell, &mut io::stdout());
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
  let mut cmd = Cli::command();
  let bin_name = cmd.get_name().to_string();

  let clap_shell = match shell {
    Shell::Bash => CompletionShell::Bash,
    Shell::Zsh => CompletionShell::Zsh,
    Shell::Fish => CompletionShell::Fish,
    Shell::Powershell => CompletionShell::PowerShell,
    Shell::Elvish => CompletionShell::Elvish,
  };

  generate(clap_shell, &mut cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bash_completions_cover_subcommands() {
    let mut buffer = Vec::new();
    write_completions(Shell::Bash, &mut buffer);

    let script = String::from_utf8(buffer).unwrap();
    assert!(script.contains("fw-prebuild"));
    assert!(script.contains("src-dir"));
    assert!(script.contains("--custom-src-dir"));
  }
}
