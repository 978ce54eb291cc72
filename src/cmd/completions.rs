//! Completions command implementation
//!
//! Handles the `assetpipe completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::{Arg, ArgAction, Command};
use clap_complete::{generate, Shell};
use std::io::Write;

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
///
/// # Examples
///
/// ```bash
/// # Bash
/// assetpipe completions bash > /etc/bash_completion.d/assetpipe
///
/// # Zsh
/// assetpipe completions zsh > ~/.zfunc/_assetpipe
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

/// Write the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    // Cli lives in the binary, so the command tree is rebuilt here
    let mut cmd = command();
    generate(shell, &mut cmd, "assetpipe", out);
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Descriptor to use instead of ./assetpipe.toml")
}

fn command() -> Command {
    Command::new("assetpipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declarative static-asset build pipeline")
        .arg(
            Arg::new("no-emoji")
                .long("no-emoji")
                .help("Disable emoji output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("Build every entry point")
                .arg(config_arg())
                .arg(
                    Arg::new("dry-run")
                        .short('d')
                        .long("dry-run")
                        .action(ArgAction::SetTrue),
                )
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the descriptor and check external tools")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("init")
                .about("Write a starter assetpipe.toml")
                .arg(
                    Arg::new("preset")
                        .short('p')
                        .long("preset")
                        .value_parser(["production", "minimal"]),
                ),
        )
        .subcommand(Command::new("completions").about("Generate shell completions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_cover_every_subcommand() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        for name in ["build", "check", "init", "completions"] {
            assert!(script.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_completion_command_is_consistent() {
        command().debug_assert();
    }
}
