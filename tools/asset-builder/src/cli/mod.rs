//! Command implementations

pub mod build;
pub mod check;
pub mod inspect;
pub mod models;

use std::path::Path;

use anyhow::{Context, Result};
use assetpack_shared::BuildConfig;

/// Load a configuration file, resolving relative paths against its directory.
fn load_config(path: &Path) -> Result<BuildConfig> {
    BuildConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}
