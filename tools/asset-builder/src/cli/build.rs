//! Build command - materialize every resource and write assets.bin

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_builder::{AssetsBuilder, HttpFetcher, StaticDirFetcher};
use assetpack_shared::PACKAGE_FORMAT;
use clap::Args;
use tracing::info;

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Configuration file (TOML, or JSON with a .json extension)
    pub config: PathBuf,

    /// Output package path
    #[arg(short, long, default_value = PACKAGE_FORMAT.output_name)]
    pub output: PathBuf,

    /// Local directory holding the preset tree (fonts/, twemoji64/, wakenet_model/, charsets/)
    #[arg(long, conflicts_with = "static_url")]
    pub static_dir: Option<PathBuf>,

    /// Base URL serving the preset tree
    #[arg(long)]
    pub static_url: Option<String>,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;

    let builder = match (&args.static_dir, &args.static_url) {
        (_, Some(url)) => AssetsBuilder::new(HttpFetcher::new(url.as_str())),
        (Some(dir), None) => AssetsBuilder::new(StaticDirFetcher::new(dir)),
        (None, None) => {
            let dir = args
                .config
                .parent()
                .map(|p| p.join("static"))
                .unwrap_or_else(|| PathBuf::from("static"));
            info!("No preset source given, using {}", dir.display());
            AssetsBuilder::new(StaticDirFetcher::new(dir))
        }
    };

    let bytes = builder
        .build_with_progress(&config, &mut |percent, message| {
            info!("[{:3.0}%] {}", percent, message);
        })
        .context("Build failed")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Wrote {} ({} bytes)", args.output.display(), bytes.len());
    Ok(())
}
