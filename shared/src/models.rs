//! Wake-word model families and preset asset catalogs.
//!
//! The device firmware ships one of two mutually exclusive WakeNet builds,
//! selected by chip: the small `esp32c3`/`esp32c6` parts run WakeNet9s, every
//! other chip runs WakeNet9. A model name's prefix tells which build it targets.

use std::fmt;

/// Chips that run the reduced WakeNet9s models.
pub const WAKENET9S_CHIPS: &[&str] = &["esp32c3", "esp32c6"];

/// Member files making up one wake-word model group.
pub const MODEL_MEMBER_FILES: &[&str] = &["_MODEL_INFO_", "wn9_data", "wn9_index"];

/// WakeNet9 models available as presets.
pub const WAKENET9_MODELS: &[&str] = &[
    "wn9_alexa",
    "wn9_astrolabe_tts",
    "wn9_bluechip_tts2",
    "wn9_computer_tts",
    "wn9_haixiaowu_tts",
    "wn9_heyily_tts2",
    "wn9_heyprinter_tts",
    "wn9_heywanda_tts",
    "wn9_heywillow_tts",
    "wn9_hiesp",
    "wn9_hifairy_tts2",
    "wn9_hijason_tts2",
    "wn9_hijolly_tts2",
    "wn9_hijoy_tts",
    "wn9_hilexin",
    "wn9_hilili_tts",
    "wn9_himfive",
    "wn9_himiaomiao_tts",
    "wn9_hitelly_tts",
    "wn9_hiwalle_tts2",
    "wn9_hixiaoxing_tts",
    "wn9_jarvis_tts",
    "wn9_linaiban_tts2",
    "wn9_miaomiaotongxue_tts",
    "wn9_mycroft_tts",
    "wn9_nihaobaiying_tts2",
    "wn9_nihaodongdong_tts2",
    "wn9_nihaomiaoban_tts2",
    "wn9_nihaoxiaoan_tts2",
    "wn9_nihaoxiaoxin_tts",
    "wn9_nihaoxiaoyi_tts2",
    "wn9_nihaoxiaozhi",
    "wn9_nihaoxiaozhi_tts",
    "wn9_sophia_tts",
    "wn9_xiaoaitongxue",
    "wn9_xiaobinxiaobin_tts",
    "wn9_xiaojianxiaojian_tts2",
    "wn9_xiaokangtongxue_tts2",
    "wn9_xiaolongxiaolong_tts",
    "wn9_xiaoluxiaolu_tts2",
    "wn9_xiaomeitongxue_tts",
    "wn9_xiaomingtongxue_tts2",
    "wn9_xiaosurou_tts2",
    "wn9_xiaotexiaote_tts2",
    "wn9_xiaoyaxiaoya_tts2",
    "wn9_xiaoyutongxue_tts2",
];

/// WakeNet9s models available as presets.
pub const WAKENET9S_MODELS: &[&str] = &[
    "wn9s_alexa",
    "wn9s_hiesp",
    "wn9s_hijason",
    "wn9s_hilexin",
    "wn9s_nihaoxiaozhi",
];

/// Emotions provided by every preset emoji set, in manifest order.
pub const PRESET_EMOJI_NAMES: &[&str] = &[
    "neutral",
    "happy",
    "laughing",
    "funny",
    "sad",
    "angry",
    "crying",
    "loving",
    "embarrassed",
    "surprised",
    "shocked",
    "thinking",
    "winking",
    "cool",
    "relaxed",
    "delicious",
    "kissy",
    "confident",
    "sleepy",
    "silly",
    "confused",
];

/// Wake-word model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    WakeNet9,
    WakeNet9s,
}

impl ModelFamily {
    /// Family run by the given chip.
    pub fn for_chip(chip_model: &str) -> Self {
        if WAKENET9S_CHIPS.contains(&chip_model) {
            Self::WakeNet9s
        } else {
            Self::WakeNet9
        }
    }

    /// Name prefix shared by every model of this family.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::WakeNet9 => "wn9_",
            Self::WakeNet9s => "wn9s_",
        }
    }

    /// Whether `model_name` belongs to this family.
    pub fn accepts(self, model_name: &str) -> bool {
        model_name.starts_with(self.prefix())
    }

    /// Preset models of this family.
    pub fn known_models(self) -> &'static [&'static str] {
        match self {
            Self::WakeNet9 => WAKENET9_MODELS,
            Self::WakeNet9s => WAKENET9S_MODELS,
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WakeNet9 => f.write_str("WakeNet9"),
            Self::WakeNet9s => f.write_str("WakeNet9s"),
        }
    }
}

/// Remote path of one member file of a model group.
pub fn model_file_path(model_name: &str, member: &str) -> String {
    format!("wakenet_model/{}/{}", model_name, member)
}

/// Remote path of a preset font.
pub fn preset_font_path(preset: &str) -> String {
    format!("fonts/{}.bin", preset)
}

/// Remote path of one emoji of a preset set.
pub fn preset_emoji_path(preset: &str, name: &str) -> String {
    format!("{}/{}.png", preset, name)
}

/// Edge length of the images in a preset emoji set.
pub fn preset_emoji_size(preset: &str) -> u32 {
    if preset == "twemoji32" { 32 } else { 64 }
}

/// Remote path of a named font charset, `None` for unknown names.
///
/// `basic` is an alias of `latin`.
pub fn charset_path(charset: &str) -> Option<&'static str> {
    match charset {
        "basic" | "latin" => Some("charsets/latin1.txt"),
        "deepseek" => Some("charsets/deepseek.txt"),
        "gb2312" => Some("charsets/gb2312.txt"),
        _ => None,
    }
}
