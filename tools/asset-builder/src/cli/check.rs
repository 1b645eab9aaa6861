//! Check command - validate a configuration and show the resource plan

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_builder::ResourcePlan;
use clap::Args;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Configuration file (TOML, or JSON with a .json extension)
    pub config: PathBuf,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    config.validate().context("Invalid configuration")?;
    let plan = ResourcePlan::from_config(&config);

    println!("=== Resources ===");
    println!("  {:<12} {:<32} index file", "index", "index.json");
    for resource in &plan.resources {
        println!(
            "  {:<12} {:<32} {}",
            resource.kind.to_string(),
            resource.filename,
            resource.description
        );
    }

    let index = plan
        .manifest
        .to_json_bytes()
        .context("Failed to serialize index.json")?;
    println!();
    println!("=== index.json ===");
    println!("{}", String::from_utf8_lossy(&index));
    Ok(())
}
