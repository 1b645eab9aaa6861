//! Embedded package manifest (`index.json`)
//!
//! The device reads this document first to learn its display setup and which
//! packaged files hold the wake-word models, text font, skins and emoji set.
//! Every filename it references must exist in the same package.

use serde::{Deserialize, Serialize};

/// Default color format advertised when the configuration does not name one.
pub const DEFAULT_COLOR_FORMAT: &str = "RGB565";

/// Root of `index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    pub chip_model: String,
    pub display_config: DisplayManifest,
    /// Aggregated wake-word models (`srmodels.bin`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srmodels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<SkinManifest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emoji_collection: Vec<EmojiManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayManifest {
    pub width: u32,
    pub height: u32,
    pub monochrome: bool,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<SkinModeManifest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<SkinModeManifest>,
}

impl SkinManifest {
    pub fn is_empty(&self) -> bool {
        self.light.is_none() && self.dark.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinModeManifest {
    pub text_color: String,
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiManifestEntry {
    pub name: String,
    pub file: String,
}

impl IndexManifest {
    /// Every package filename this manifest points at.
    pub fn referenced_files(&self) -> Vec<&str> {
        let mut files = Vec::new();
        files.extend(self.srmodels.as_deref());
        files.extend(self.text_font.as_deref());
        if let Some(skin) = &self.skin {
            for mode in [&skin.light, &skin.dark].into_iter().flatten() {
                files.extend(mode.background_image.as_deref());
            }
        }
        files.extend(self.emoji_collection.iter().map(|e| e.file.as_str()));
        files
    }

    /// Serialize as pretty-printed UTF-8 JSON (two-space indent)
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexManifest {
        IndexManifest {
            version: 1,
            chip_model: "esp32s3".to_string(),
            display_config: DisplayManifest {
                width: 320,
                height: 240,
                monochrome: false,
                color: DEFAULT_COLOR_FORMAT.to_string(),
            },
            srmodels: Some("srmodels.bin".to_string()),
            text_font: None,
            skin: Some(SkinManifest {
                light: Some(SkinModeManifest {
                    text_color: "#000000".to_string(),
                    background_color: "#ffffff".to_string(),
                    background_image: Some("background_light.raw".to_string()),
                }),
                dark: None,
            }),
            emoji_collection: vec![EmojiManifestEntry {
                name: "happy".to_string(),
                file: "happy.png".to_string(),
            }],
        }
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut manifest = sample();
        manifest.srmodels = None;
        manifest.skin = None;
        manifest.emoji_collection.clear();

        let json = String::from_utf8(manifest.to_json_bytes().unwrap()).unwrap();
        assert!(!json.contains("srmodels"));
        assert!(!json.contains("text_font"));
        assert!(!json.contains("skin"));
        assert!(!json.contains("emoji_collection"));
        assert!(json.contains("\"chip_model\": \"esp32s3\""));
    }

    #[test]
    fn test_field_order() {
        let json = String::from_utf8(sample().to_json_bytes().unwrap()).unwrap();
        let version = json.find("\"version\"").unwrap();
        let chip = json.find("\"chip_model\"").unwrap();
        let display = json.find("\"display_config\"").unwrap();
        let emoji = json.find("\"emoji_collection\"").unwrap();
        assert!(version < chip && chip < display && display < emoji);
    }

    #[test]
    fn test_referenced_files() {
        let manifest = sample();
        assert_eq!(
            manifest.referenced_files(),
            vec!["srmodels.bin", "background_light.raw", "happy.png"]
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let manifest = sample();
        let bytes = manifest.to_json_bytes().unwrap();
        assert_eq!(IndexManifest::from_json_bytes(&bytes).unwrap(), manifest);
    }
}
