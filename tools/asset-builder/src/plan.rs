//! Resource planning
//!
//! Resolves a configuration into the ordered list of package files and the
//! `index.json` manifest that points at them, without touching any resource.
//!
//! # Order
//! ```text
//! srmodels.bin            wake-word models (if configured)
//! <font>.bin              preset or converted custom font
//! <emoji>.<ext> ...       one file per emotion
//! background_light.raw    light skin image background
//! background_dark.raw     dark skin image background
//! ```

use std::fmt;
use std::path::PathBuf;

use assetpack_shared::fs::lowercase_extension;
use assetpack_shared::models::{
    PRESET_EMOJI_NAMES, preset_emoji_path, preset_emoji_size, preset_font_path,
};
use assetpack_shared::{
    BuildConfig, CustomFontConfig, DEFAULT_COLOR_FORMAT, DisplayManifest, EmojiKind,
    EmojiManifestEntry, FontKind, ImageSize, IndexManifest, ModelFamily, PACKAGE_FORMAT,
    SkinManifest, SkinMode, SkinModeManifest,
};
use tracing::warn;

/// Package filename of the light skin background
pub const BACKGROUND_LIGHT_NAME: &str = "background_light.raw";
/// Package filename of the dark skin background
pub const BACKGROUND_DARK_NAME: &str = "background_dark.raw";

/// Extension used for custom emoji whose source has none
const DEFAULT_EMOJI_EXTENSION: &str = "png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Wakeword,
    Font,
    Emoji,
    Background,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wakeword => "wakeword",
            Self::Font => "font",
            Self::Emoji => "emoji",
            Self::Background => "background",
        };
        f.write_str(name)
    }
}

/// Skin variant a background belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinVariant {
    Light,
    Dark,
}

impl SkinVariant {
    pub fn filename(self) -> &'static str {
        match self {
            Self::Light => BACKGROUND_LIGHT_NAME,
            Self::Dark => BACKGROUND_DARK_NAME,
        }
    }

    fn default_colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Light => ("#000000", "#ffffff"),
            Self::Dark => ("#ffffff", "#121212"),
        }
    }
}

/// Where a planned resource's bytes come from.
#[derive(Debug, Clone)]
pub enum ResourceSource {
    /// Member files of one wake-word model group, fetched remotely
    ModelGroup { model: String, family: ModelFamily },
    /// A file from the static preset tree
    Preset { path: String },
    /// A user font run through the font converter
    CustomFont(CustomFontConfig),
    /// A user emoji image, shrunk to `target` when larger
    CustomEmoji { file: PathBuf, target: ImageSize },
    /// A user background image, converted to RGB565
    Background { file: PathBuf, variant: SkinVariant },
}

/// One package file the build will produce.
#[derive(Debug, Clone)]
pub struct PlannedResource {
    pub kind: ResourceKind,
    pub filename: String,
    pub description: String,
    pub source: ResourceSource,
    /// Pixel size recorded in the directory entry, when known up front
    pub size: Option<ImageSize>,
}

/// Ordered resources plus the manifest describing them.
#[derive(Debug, Clone)]
pub struct ResourcePlan {
    pub manifest: IndexManifest,
    pub resources: Vec<PlannedResource>,
}

impl ResourcePlan {
    /// Resolve `config` into a plan. The configuration should already be validated.
    pub fn from_config(config: &BuildConfig) -> Self {
        let mut resources = Vec::new();
        let theme = &config.theme;

        let mut srmodels = None;
        if let Some(model) = theme.wakeword.as_deref().filter(|m| !m.is_empty()) {
            let family = ModelFamily::for_chip(&config.chip.model);
            srmodels = Some(PACKAGE_FORMAT.srmodels_name.to_string());
            resources.push(PlannedResource {
                kind: ResourceKind::Wakeword,
                filename: PACKAGE_FORMAT.srmodels_name.to_string(),
                description: format!("Wake-word model {} ({})", model, family),
                source: ResourceSource::ModelGroup {
                    model: model.to_string(),
                    family,
                },
                size: None,
            });
        }

        let font = theme.font.as_ref().and_then(|font| match font.kind {
            FontKind::Preset => font.preset.as_deref().map(|preset| PlannedResource {
                kind: ResourceKind::Font,
                filename: format!("{}.bin", preset),
                description: format!("Preset font {}", preset),
                source: ResourceSource::Preset {
                    path: preset_font_path(preset),
                },
                size: None,
            }),
            FontKind::Custom => font
                .custom
                .as_ref()
                .filter(|custom| custom.file.is_some())
                .map(|custom| PlannedResource {
                    kind: ResourceKind::Font,
                    filename: custom.output_filename(),
                    description: format!("Custom font {}px, {} bpp", custom.size, custom.bpp),
                    source: ResourceSource::CustomFont(custom.clone()),
                    size: None,
                }),
        });
        let text_font = font.as_ref().map(|f| f.filename.clone());
        resources.extend(font);

        let emoji = plan_emoji(config);
        let emoji_collection = emoji
            .iter()
            .map(|(name, resource)| EmojiManifestEntry {
                name: name.clone(),
                file: resource.filename.clone(),
            })
            .collect();
        resources.extend(emoji.into_iter().map(|(_, resource)| resource));

        let skin = &theme.skin;
        let variants = [
            (SkinVariant::Light, skin.light.as_ref()),
            (SkinVariant::Dark, skin.dark.as_ref()),
        ];
        for (variant, mode) in variants {
            if let Some(image) = mode.and_then(SkinMode::image) {
                resources.push(PlannedResource {
                    kind: ResourceKind::Background,
                    filename: variant.filename().to_string(),
                    description: match variant {
                        SkinVariant::Light => "Light background image".to_string(),
                        SkinVariant::Dark => "Dark background image".to_string(),
                    },
                    source: ResourceSource::Background {
                        file: image.to_path_buf(),
                        variant,
                    },
                    size: None,
                });
            }
        }

        let skin = SkinManifest {
            light: skin.light.as_ref().map(|m| skin_manifest(SkinVariant::Light, m)),
            dark: skin.dark.as_ref().map(|m| skin_manifest(SkinVariant::Dark, m)),
        };

        let display = &config.chip.display;
        let manifest = IndexManifest {
            version: PACKAGE_FORMAT.manifest_version,
            chip_model: config.chip.model.clone(),
            display_config: DisplayManifest {
                width: display.width,
                height: display.height,
                monochrome: false,
                color: display
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLOR_FORMAT.to_string()),
            },
            srmodels,
            text_font,
            skin: (!skin.is_empty()).then_some(skin),
            emoji_collection,
        };

        Self {
            manifest,
            resources,
        }
    }

    /// Package filenames in plan order, `index.json` first.
    pub fn filenames(&self) -> Vec<&str> {
        std::iter::once(PACKAGE_FORMAT.manifest_name)
            .chain(self.resources.iter().map(|r| r.filename.as_str()))
            .collect()
    }

    pub fn custom_font(&self) -> Option<(&str, &CustomFontConfig)> {
        self.resources.iter().find_map(|r| match &r.source {
            ResourceSource::CustomFont(custom) => Some((r.filename.as_str(), custom)),
            _ => None,
        })
    }
}

/// Emoji resources keyed by emotion name, in manifest order.
fn plan_emoji(config: &BuildConfig) -> Vec<(String, PlannedResource)> {
    let Some(emoji) = &config.theme.emoji else {
        return Vec::new();
    };

    match emoji.kind {
        EmojiKind::Preset => {
            let Some(preset) = emoji.preset.as_deref() else {
                return Vec::new();
            };
            let edge = preset_emoji_size(preset);
            let size = ImageSize::new(edge, edge);
            PRESET_EMOJI_NAMES
                .iter()
                .map(|&name| {
                    let resource = PlannedResource {
                        kind: ResourceKind::Emoji,
                        filename: format!("{}.png", name),
                        description: format!("Emoji {} ({}x{})", name, edge, edge),
                        source: ResourceSource::Preset {
                            path: preset_emoji_path(preset, name),
                        },
                        size: Some(size),
                    };
                    (name.to_string(), resource)
                })
                .collect()
        }
        EmojiKind::Custom => {
            let Some(custom) = &emoji.custom else {
                return Vec::new();
            };
            if !custom.images.contains_key("neutral") {
                warn!("Custom emoji set has no 'neutral' image; the device will use its default");
            }
            let target = custom.size;
            custom
                .images
                .iter()
                .map(|(name, file)| {
                    let extension = lowercase_extension(file)
                        .unwrap_or_else(|| DEFAULT_EMOJI_EXTENSION.to_string());
                    let resource = PlannedResource {
                        kind: ResourceKind::Emoji,
                        filename: format!("{}.{}", name, extension),
                        description: format!(
                            "Emoji {} ({}x{})",
                            name, target.width, target.height
                        ),
                        source: ResourceSource::CustomEmoji {
                            file: file.clone(),
                            target,
                        },
                        size: Some(target),
                    };
                    (name.clone(), resource)
                })
                .collect()
        }
    }
}

fn skin_manifest(variant: SkinVariant, mode: &SkinMode) -> SkinModeManifest {
    let (text, background) = variant.default_colors();
    SkinModeManifest {
        text_color: mode.text_color.clone().unwrap_or_else(|| text.to_string()),
        background_color: mode
            .background_color
            .clone()
            .unwrap_or_else(|| background.to_string()),
        background_image: mode.image().map(|_| variant.filename().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> BuildConfig {
        let toml = format!(
            "[chip]\nmodel = \"esp32s3\"\n[chip.display]\nwidth = 320\nheight = 240\n{}",
            extra
        );
        BuildConfig::from_toml(&toml).unwrap()
    }

    #[test]
    fn test_minimal_plan() {
        let plan = ResourcePlan::from_config(&config(""));
        assert!(plan.resources.is_empty());
        assert_eq!(plan.filenames(), vec!["index.json"]);

        let manifest = &plan.manifest;
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.chip_model, "esp32s3");
        assert_eq!(manifest.display_config.color, "RGB565");
        assert!(!manifest.display_config.monochrome);
        assert!(manifest.srmodels.is_none());
        assert!(manifest.text_font.is_none());
        assert!(manifest.skin.is_none());
        assert!(manifest.emoji_collection.is_empty());
    }

    #[test]
    fn test_resource_order() {
        let plan = ResourcePlan::from_config(&config(
            r#"
            [theme]
            wakeword = "wn9_hiesp"
            [theme.font]
            type = "preset"
            preset = "font_puhui_20_4"
            [theme.emoji]
            type = "custom"
            [theme.emoji.custom]
            size = { width = 48, height = 48 }
            images = { sad = "b.GIF", happy = "a.png" }
            [theme.skin.dark]
            background_type = "image"
            background_image = "dark.jpg"
            [theme.skin.light]
            background_type = "image"
            background_image = "light.jpg"
            "#,
        ));

        assert_eq!(
            plan.filenames(),
            vec![
                "index.json",
                "srmodels.bin",
                "font_puhui_20_4.bin",
                "happy.png",
                "sad.gif",
                "background_light.raw",
                "background_dark.raw",
            ]
        );
        let kinds: Vec<_> = plan.resources.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Wakeword,
                ResourceKind::Font,
                ResourceKind::Emoji,
                ResourceKind::Emoji,
                ResourceKind::Background,
                ResourceKind::Background,
            ]
        );
        assert_eq!(plan.resources[2].size, Some(ImageSize::new(48, 48)));
    }

    #[test]
    fn test_manifest_references_planned_files() {
        let plan = ResourcePlan::from_config(&config(
            r#"
            [theme]
            wakeword = "wn9_hiesp"
            [theme.font]
            type = "custom"
            [theme.font.custom]
            file = "my.ttf"
            size = 24
            bpp = 2
            [theme.emoji]
            type = "preset"
            preset = "twemoji32"
            [theme.skin.light]
            background_type = "image"
            background_image = "light.jpg"
            "#,
        ));

        let filenames = plan.filenames();
        for file in plan.manifest.referenced_files() {
            assert!(filenames.contains(&file), "{file} not planned");
        }
        assert_eq!(plan.manifest.srmodels.as_deref(), Some("srmodels.bin"));
        assert_eq!(plan.manifest.text_font.as_deref(), Some("font_custom_24_2.bin"));
        assert_eq!(plan.manifest.emoji_collection.len(), 21);
        assert_eq!(plan.manifest.emoji_collection[0].name, "neutral");
        assert_eq!(plan.manifest.emoji_collection[0].file, "neutral.png");
        assert_eq!(plan.custom_font().map(|(f, _)| f), Some("font_custom_24_2.bin"));

        let emoji = plan
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::Emoji)
            .unwrap();
        assert_eq!(emoji.size, Some(ImageSize::new(32, 32)));
        assert!(matches!(
            &emoji.source,
            ResourceSource::Preset { path } if path == "twemoji32/neutral.png"
        ));
    }

    #[test]
    fn test_skin_defaults() {
        let plan = ResourcePlan::from_config(&config(
            r#"
            [theme.skin.light]
            [theme.skin.dark]
            background_type = "image"
            "#,
        ));

        let skin = plan.manifest.skin.unwrap();
        let light = skin.light.unwrap();
        assert_eq!(light.text_color, "#000000");
        assert_eq!(light.background_color, "#ffffff");
        assert!(light.background_image.is_none());

        // image type without an image falls back to a plain color
        let dark = skin.dark.unwrap();
        assert_eq!(dark.text_color, "#ffffff");
        assert_eq!(dark.background_color, "#121212");
        assert!(dark.background_image.is_none());
        assert!(plan.resources.is_empty());
    }

    #[test]
    fn test_color_background_ignores_image() {
        let plan = ResourcePlan::from_config(&config(
            r##"
            [theme.skin.light]
            text_color = "#111111"
            background_type = "color"
            background_image = "unused.png"
            "##,
        ));

        let light = plan.manifest.skin.unwrap().light.unwrap();
        assert_eq!(light.text_color, "#111111");
        assert!(light.background_image.is_none());
        assert!(plan.resources.is_empty());
    }

    #[test]
    fn test_custom_emoji_without_extension() {
        let plan = ResourcePlan::from_config(&config(
            r#"
            [theme.emoji]
            type = "custom"
            [theme.emoji.custom]
            images = { neutral = "emoji/neutral" }
            "#,
        ));
        assert_eq!(plan.resources[0].filename, "neutral.png");
        assert_eq!(plan.resources[0].size, Some(ImageSize::new(64, 64)));
    }
}
