//! Builds `assets.bin` device packages from a theme configuration.
//!
//! - [`builder`] - build orchestration ([`AssetsBuilder`])
//! - [`plan`] - configuration to ordered resources and `index.json`
//! - [`fetch`] - preset retrieval from a static tree (directory or HTTP)
//! - [`font`] - custom font conversion and the per-build font cache
//! - [`scale`] - emoji downscaling (raster and animated GIF)
//! - [`background`] - background images to RGB565
//! - [`error`] - [`BuildError`] and collaborator errors

pub mod background;
pub mod builder;
pub mod error;
pub mod fetch;
pub mod font;
pub mod plan;
pub mod progress;
pub mod scale;

pub use builder::{AssetsBuilder, BuildContext, LogicalResource};
pub use error::{BuildError, ConversionError, FetchError};
pub use fetch::{HttpFetcher, RemoteFetch, StaticDirFetcher};
pub use font::{FontCache, FontConvert, FontParams, LvFontConvCommand};
pub use plan::{PlannedResource, ResourceKind, ResourcePlan, ResourceSource};
pub use scale::{EmojiScaler, ImageScale};
