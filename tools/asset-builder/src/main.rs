//! asset-builder - build tool for device asset packages
//!
//! # Commands
//!
//! - `asset-builder build <config>` - Build `assets.bin` from a theme configuration
//! - `asset-builder check <config>` - Validate a configuration and show what it would pack
//! - `asset-builder inspect <assets.bin>` - Verify a package and list its files
//! - `asset-builder models` - List known wake-word models
//!
//! # Usage
//!
//! ```bash
//! # Build against a local copy of the preset tree
//! asset-builder build theme.toml --static-dir ./static -o assets.bin
//!
//! # Build fetching presets over HTTP
//! asset-builder build theme.json --static-url https://example.com/static
//! ```

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Build tool for device asset packages
#[derive(Parser)]
#[command(name = "asset-builder")]
#[command(about = "Build assets.bin device packages from a theme configuration")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets.bin from a configuration file
    Build(cli::build::BuildArgs),

    /// Validate a configuration and print the resource plan and index.json
    Check(cli::check::CheckArgs),

    /// Verify a package and list its contents
    Inspect(cli::inspect::InspectArgs),

    /// List known wake-word models
    Models(cli::models::ModelsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Build(args) => cli::build::execute(args),
        Commands::Check(args) => cli::check::execute(args),
        Commands::Inspect(args) => cli::inspect::execute(args),
        Commands::Models(args) => cli::models::execute(args),
    }
}
