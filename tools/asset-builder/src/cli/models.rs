//! Models command - list known wake-word models

use anyhow::Result;
use assetpack_shared::ModelFamily;
use clap::Args;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Only list models usable on this chip (e.g. esp32s3, esp32c3)
    #[arg(long)]
    pub chip: Option<String>,
}

/// Execute the models command
pub fn execute(args: ModelsArgs) -> Result<()> {
    let families = match &args.chip {
        Some(chip) => vec![ModelFamily::for_chip(chip)],
        None => vec![ModelFamily::WakeNet9, ModelFamily::WakeNet9s],
    };

    for family in families {
        let models = family.known_models();
        println!("{} ({} models)", family, models.len());
        for model in models {
            println!("  {}", model);
        }
    }
    Ok(())
}
