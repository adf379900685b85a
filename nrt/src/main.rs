//! NRT - nginx resolution tree
//!
//! Command-line entry point: loads directive batches and resolves them.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// NRT - Resolve container directives into a validated virtual-host tree
#[derive(Parser)]
#[command(name = "nrt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a directive batch and print the tree as JSON
    Resolve {
        /// Batch file (.json / .toml) or directory of batch files
        path: PathBuf,
    },

    /// Check that every location of a directive batch is valid
    Validate {
        /// Batch file (.json / .toml) or directory of batch files
        path: PathBuf,
    },

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    // stdout is reserved for the tree
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Resolve { path } => {
            tracing::info!("Resolving directives: {}", path.display());

            let tree = match nrt_config::resolve_path(&path) {
                Ok(tree) => tree,
                Err(e) => {
                    eprintln!("❌ Directive Error: {}", e);
                    std::process::exit(1);
                }
            };

            let json = serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?;
            println!("{}", json);
        }

        Commands::Validate { path } => {
            tracing::info!("Validating directives: {}", path.display());

            let tree = match nrt_config::resolve_path(&path) {
                Ok(tree) => tree,
                Err(e) => {
                    eprintln!("❌ Directive Error: {}", e);
                    std::process::exit(1);
                }
            };

            let invalid = tree.invalid_locations();
            if invalid.is_empty() {
                println!(
                    "✅ '{}' is valid! ({} directive(s))",
                    path.display(),
                    tree.len()
                );
            } else {
                eprintln!("❌ {} invalid location(s):", invalid.len());
                for key in &invalid {
                    eprintln!("   {}", key);
                }
                std::process::exit(1);
            }
        }

        Commands::Version => {
            println!("NRT v{}", nrt_core::VERSION);
        }
    }

    Ok(())
}
