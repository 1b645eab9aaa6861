//! Shared types for the assetpack device package tools.
//!
//! - [`package_format`] - layout constants of the device package
//! - [`config`] - build configuration model and validation
//! - [`manifest`] - the embedded `index.json` document
//! - [`models`] - wake-word model families and preset catalogs

pub mod config;
pub mod fs;
pub mod manifest;
pub mod models;
pub mod package_format;

pub use config::{
    BackgroundType, BuildConfig, ChipConfig, ConfigLoadError, ConfigValidationError,
    CustomEmojiConfig, CustomFontConfig, DisplayConfig, EmojiConfig, EmojiKind, FontConfig,
    FontKind, ImageSize, ScalingConfig, ScalingMode, SkinConfig, SkinMode, ThemeConfig,
};
pub use manifest::{
    DEFAULT_COLOR_FORMAT, DisplayManifest, EmojiManifestEntry, IndexManifest, SkinManifest,
    SkinModeManifest,
};
pub use models::ModelFamily;
pub use package_format::{PACKAGE_FORMAT, PackageFormat};
