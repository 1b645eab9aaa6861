//! Inspect command - verify a package and list its files

use std::path::PathBuf;

use anyhow::{Context, Result};
use assetpack_common::{ModelSetReader, PackageReader};
use assetpack_shared::{IndexManifest, PACKAGE_FORMAT};
use clap::Args;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Package file to inspect
    pub package: PathBuf,

    /// Also list the wake-word model groups inside srmodels.bin
    #[arg(long)]
    pub models: bool,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.package)
        .with_context(|| format!("Failed to read {}", args.package.display()))?;
    let reader = PackageReader::parse(&bytes)
        .with_context(|| format!("{} is not a valid package", args.package.display()))?;

    let header = reader.header();
    println!("=== {} ===", args.package.display());
    println!("  Files:    {}", header.total_files);
    println!("  Checksum: 0x{:04X} (verified)", header.checksum);
    println!("  Data:     {} bytes", header.combined_data_length);
    println!();
    for entry in reader.entries() {
        println!(
            "  {:<32} {:>9} bytes  @{:<9} {}x{}",
            entry.name,
            entry.size(),
            entry.offset,
            entry.dimensions.width,
            entry.dimensions.height
        );
    }

    if let Some(index) = reader.find(PACKAGE_FORMAT.manifest_name) {
        let manifest = IndexManifest::from_json_bytes(index.data)
            .context("Embedded index.json is not valid")?;
        for file in manifest.referenced_files() {
            if reader.find(file).is_none() {
                anyhow::bail!("index.json references missing file {}", file);
            }
        }
        println!();
        println!("=== index.json ===");
        println!("{}", String::from_utf8_lossy(index.data));
    }

    if args.models {
        if let Some(srmodels) = reader.find(PACKAGE_FORMAT.srmodels_name) {
            let models = ModelSetReader::parse(srmodels.data)
                .context("srmodels.bin is not a valid model set")?;
            println!();
            println!("=== {} ===", PACKAGE_FORMAT.srmodels_name);
            for group in models.groups() {
                println!("  {}", group.name);
                for member in &group.members {
                    println!("    {:<32} {:>9} bytes", member.name, member.data.len());
                }
            }
        }
    }

    Ok(())
}
