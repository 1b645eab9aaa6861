//! Build configuration model
//!
//! The configuration selects everything that goes into one package: target chip
//! and display, wake-word model, font, emoji set, light/dark skins and the emoji
//! scaling heuristic. It is loaded from TOML or JSON and validated before any
//! resource is touched.
//!
//! JSON documents exported by the web theme editor use camelCase keys; those are
//! accepted as aliases.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ModelFamily;

/// Smallest custom font size accepted by the converter.
pub const MIN_FONT_SIZE: u32 = 8;
/// Largest custom font size accepted by the converter.
pub const MAX_FONT_SIZE: u32 = 80;
/// Bits per pixel supported by the device font renderer.
pub const VALID_FONT_BPP: &[u8] = &[1, 2, 4, 8];

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A configuration that cannot be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("Chip model is required")]
    MissingChipModel,
    #[error("Display resolution must be non-zero (got {width}x{height})")]
    InvalidDisplay { width: u32, height: u32 },
    #[error("Font type 'preset' requires a preset name")]
    MissingFontPreset,
    #[error("Font type 'custom' requires a font file")]
    MissingFontFile,
    #[error("Font size must be between 8 and 80 (got {0})")]
    InvalidFontSize(u32),
    #[error("Font bpp must be 1, 2, 4 or 8 (got {0})")]
    InvalidFontBpp(u8),
    #[error("Wake-word model '{model}' is not a {family} model (required by chip {chip})")]
    WakewordFamilyMismatch {
        model: String,
        chip: String,
        family: ModelFamily,
    },
    #[error("Emoji type 'preset' requires a preset name")]
    MissingEmojiPreset,
    #[error("Emoji target size must be between 1 and 65535 (got {width}x{height})")]
    InvalidEmojiSize { width: u32, height: u32 },
    #[error(
        "Scaling thresholds must satisfy 0 < sharp <= smooth <= 1 (got smooth={smooth}, sharp={sharp})"
    )]
    InvalidScalingThresholds { smooth: f32, sharp: f32 },
}

/// Complete build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub chip: ChipConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub scaling: ScalingConfig,
}

/// Target chip and display
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChipConfig {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Display resolution and color format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Color format advertised in the manifest (default "RGB565")
    #[serde(default)]
    pub color: Option<String>,
}

/// Theme selections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Wake-word model name (e.g. "wn9_nihaoxiaozhi")
    #[serde(default)]
    pub wakeword: Option<String>,
    #[serde(default)]
    pub font: Option<FontConfig>,
    #[serde(default)]
    pub emoji: Option<EmojiConfig>,
    #[serde(default)]
    pub skin: SkinConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontKind {
    Preset,
    Custom,
}

/// Font selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(rename = "type")]
    pub kind: FontKind,
    /// Preset font name, fetched as `fonts/<preset>.bin`
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub custom: Option<CustomFontConfig>,
}

/// Custom font conversion parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFontConfig {
    /// TTF/OTF/WOFF source file
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub size: u32,
    #[serde(default = "default_font_bpp")]
    pub bpp: u8,
    /// Named charset: basic, latin, deepseek or gb2312
    #[serde(default)]
    pub charset: Option<String>,
    /// Extra characters to include
    #[serde(default)]
    pub symbols: Option<String>,
    /// Code point ranges, e.g. "0x20-0x7F,0x4E00-0x9FFF"
    #[serde(default)]
    pub range: Option<String>,
}

fn default_font_size() -> u32 {
    20
}

fn default_font_bpp() -> u8 {
    4
}

impl CustomFontConfig {
    /// Package filename of the converted font.
    pub fn output_filename(&self) -> String {
        format!("font_custom_{}_{}.bin", self.size, self.bpp)
    }

    /// Whether any character selection was made.
    pub fn has_character_selection(&self) -> bool {
        [&self.charset, &self.symbols, &self.range]
            .iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiKind {
    Preset,
    Custom,
}

/// Emoji set selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiConfig {
    #[serde(rename = "type")]
    pub kind: EmojiKind,
    /// Preset set name: twemoji32 or twemoji64
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub custom: Option<CustomEmojiConfig>,
}

/// Custom emoji images keyed by emotion name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomEmojiConfig {
    /// Target size every image must fit into
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(64, 64)
    }
}

/// Light and dark skins
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinConfig {
    #[serde(default)]
    pub light: Option<SkinMode>,
    #[serde(default)]
    pub dark: Option<SkinMode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
}

/// One skin variant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinMode {
    #[serde(default, alias = "textColor")]
    pub text_color: Option<String>,
    #[serde(default, alias = "backgroundColor")]
    pub background_color: Option<String>,
    #[serde(default, alias = "backgroundType")]
    pub background_type: BackgroundType,
    #[serde(default, alias = "backgroundImage")]
    pub background_image: Option<PathBuf>,
}

impl SkinMode {
    /// Background image to convert, if this skin uses one.
    pub fn image(&self) -> Option<&Path> {
        match self.background_type {
            BackgroundType::Image => self.background_image.as_deref(),
            BackgroundType::Color => None,
        }
    }
}

/// Resampling strategy for downscaled emoji
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Pick by scale ratio using the configured thresholds
    #[default]
    Auto,
    Smooth,
    Sharp,
    Pixelated,
}

/// Emoji scaling heuristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    #[serde(default)]
    pub mode: ScalingMode,
    /// Ratios at or above this use smooth resampling
    #[serde(default = "default_smooth_threshold")]
    pub smooth_threshold: f32,
    /// Ratios at or above this (and below smooth) use sharp resampling
    #[serde(default = "default_sharp_threshold")]
    pub sharp_threshold: f32,
}

fn default_smooth_threshold() -> f32 {
    0.5
}

fn default_sharp_threshold() -> f32 {
    0.25
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            mode: ScalingMode::Auto,
            smooth_threshold: default_smooth_threshold(),
            sharp_threshold: default_sharp_threshold(),
        }
    }
}

impl ScalingConfig {
    /// Concrete strategy for a downscale ratio (`target / source`, ≤ 1).
    pub fn mode_for_ratio(&self, ratio: f32) -> ScalingMode {
        if self.mode != ScalingMode::Auto {
            return self.mode;
        }
        if ratio >= self.smooth_threshold {
            ScalingMode::Smooth
        } else if ratio >= self.sharp_threshold {
            ScalingMode::Sharp
        } else {
            ScalingMode::Pixelated
        }
    }
}

impl BuildConfig {
    /// Load a configuration file (TOML, or JSON for `.json` files).
    ///
    /// Relative resource paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_owned(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            Self::from_json(&content).map_err(|source| ConfigLoadError::Json {
                path: path.to_owned(),
                source,
            })?
        } else {
            Self::from_toml(&content).map_err(|source| ConfigLoadError::Toml {
                path: path.to_owned(),
                source,
            })?
        };

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse a TOML configuration
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse a JSON configuration
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Join every relative resource path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(file) = self
            .theme
            .font
            .as_mut()
            .and_then(|font| font.custom.as_mut())
            .and_then(|custom| custom.file.as_mut())
        {
            resolve(file);
        }

        if let Some(custom) = self
            .theme
            .emoji
            .as_mut()
            .and_then(|emoji| emoji.custom.as_mut())
        {
            custom.images.values_mut().for_each(resolve);
        }

        for skin in [&mut self.theme.skin.light, &mut self.theme.skin.dark]
            .into_iter()
            .flatten()
        {
            if let Some(image) = skin.background_image.as_mut() {
                resolve(image);
            }
        }
    }

    /// Check every rule a build depends on.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.chip.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingChipModel);
        }

        let display = &self.chip.display;
        if display.width == 0 || display.height == 0 {
            return Err(ConfigValidationError::InvalidDisplay {
                width: display.width,
                height: display.height,
            });
        }

        if let Some(font) = &self.theme.font {
            validate_font(font)?;
        }

        if let Some(model) = self.theme.wakeword.as_ref().filter(|m| !m.is_empty()) {
            let family = ModelFamily::for_chip(&self.chip.model);
            if !family.accepts(model) {
                return Err(ConfigValidationError::WakewordFamilyMismatch {
                    model: model.clone(),
                    chip: self.chip.model.clone(),
                    family,
                });
            }
        }

        if let Some(emoji) = &self.theme.emoji {
            match emoji.kind {
                EmojiKind::Preset => {
                    if emoji.preset.as_deref().is_none_or(str::is_empty) {
                        return Err(ConfigValidationError::MissingEmojiPreset);
                    }
                }
                EmojiKind::Custom => {
                    let size = emoji.custom.as_ref().map(|c| c.size).unwrap_or_default();
                    let side_ok = |side: u32| (1..=u32::from(u16::MAX)).contains(&side);
                    if !side_ok(size.width) || !side_ok(size.height) {
                        return Err(ConfigValidationError::InvalidEmojiSize {
                            width: size.width,
                            height: size.height,
                        });
                    }
                }
            }
        }

        let scaling = &self.scaling;
        let thresholds_ok = scaling.sharp_threshold > 0.0
            && scaling.sharp_threshold <= scaling.smooth_threshold
            && scaling.smooth_threshold <= 1.0;
        if !thresholds_ok {
            return Err(ConfigValidationError::InvalidScalingThresholds {
                smooth: scaling.smooth_threshold,
                sharp: scaling.sharp_threshold,
            });
        }

        Ok(())
    }
}

fn validate_font(font: &FontConfig) -> Result<(), ConfigValidationError> {
    match font.kind {
        FontKind::Preset => {
            if font.preset.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigValidationError::MissingFontPreset);
            }
        }
        FontKind::Custom => {
            let Some(custom) = font.custom.as_ref().filter(|c| c.file.is_some()) else {
                return Err(ConfigValidationError::MissingFontFile);
            };
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&custom.size) {
                return Err(ConfigValidationError::InvalidFontSize(custom.size));
            }
            if !VALID_FONT_BPP.contains(&custom.bpp) {
                return Err(ConfigValidationError::InvalidFontBpp(custom.bpp));
            }
            if !custom.has_character_selection() {
                tracing::warn!(
                    "No charset, symbols or range given for custom font; using the basic charset"
                );
            }
        }
    }
    Ok(())
}
