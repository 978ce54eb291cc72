use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;
use assetpipe::cmd;

/// Declarative static-asset build pipeline
///
/// assetpipe reads assetpipe.toml (or assetpipe.json), runs every entry
/// point through its transform rules and writes browser bundles, source
/// maps and static assets to the output directory.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every entry point
    Build {
        /// Descriptor to use instead of ./assetpipe.toml
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Validate and list what would be written without writing anything
        #[arg(short, long)]
        dry_run: bool,

        /// Output as JSON (for CI/CD integration)
        #[arg(long)]
        json: bool,
    },

    /// Validate the descriptor and check external tools
    Check {
        /// Descriptor to use instead of ./assetpipe.toml
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Write a starter assetpipe.toml
    Init {
        /// Preset to use: production, minimal
        #[arg(short, long, default_value = "production")]
        preset: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    // Set console emoji mode based on CLI flag
    if cli.no_emoji {
        std::env::set_var("NO_EMOJI", "1");
    }

    let result = match &cli.command {
        Some(Commands::Build {
            config,
            dry_run,
            json,
        }) => cmd::cmd_build(config.as_deref(), *dry_run, *json),
        Some(Commands::Check { config }) => cmd::cmd_check(config.as_deref()),
        Some(Commands::Init { preset }) => cmd::cmd_init(preset),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(*shell);
            Ok(())
        }
        None => {
            // No subcommand provided, show help
            println!("assetpipe v{}", env!("CARGO_PKG_VERSION"));
            println!("Declarative static-asset build pipeline\n");
            println!("Usage: assetpipe <COMMAND>\n");
            println!("Commands:");
            println!("  build        Build every entry point");
            println!("  check        Validate the descriptor and check external tools");
            println!("  init         Write a starter assetpipe.toml");
            println!("  completions  Generate shell completions");
            println!("\nRun 'assetpipe <COMMAND> --help' for more information on a command.");
            Ok(())
        }
    };

    if let Err(e) = result {
        use assetpipe::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
