use serde::{Deserialize, Serialize};

/// Languages the service ships offline models for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
}

const CHINESE_ALIASES: &[&str] = &["zh", "zh-cn", "cn", "chinese"];
const ENGLISH_ALIASES: &[&str] = &["en", "en-us", "en-gb", "english"];
const JAPANESE_ALIASES: &[&str] = &["ja", "jp", "ja-jp", "japanese"];

impl LanguageCode {
    pub const ALL: [LanguageCode; 3] = [
        LanguageCode::Chinese,
        LanguageCode::English,
        LanguageCode::Japanese,
    ];

    /// Get the short code as a string (also the model directory name)
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Chinese => "zh",
            LanguageCode::English => "en",
            LanguageCode::Japanese => "ja",
        }
    }

    /// Whether the engine should split the text into sentences itself.
    /// Chinese is segmented by the pipeline before reaching the engine.
    pub fn uses_engine_segmentation(&self) -> bool {
        matches!(self, LanguageCode::English)
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a free-form language hint onto a supported language.
/// Unknown, empty or missing hints fall back to Chinese.
pub fn normalize_lang(lang: Option<&str>) -> LanguageCode {
    let Some(lang) = lang else {
        return LanguageCode::Chinese;
    };

    let key = lang.trim().to_lowercase();
    if CHINESE_ALIASES.contains(&key.as_str()) {
        LanguageCode::Chinese
    } else if ENGLISH_ALIASES.contains(&key.as_str()) {
        LanguageCode::English
    } else if JAPANESE_ALIASES.contains(&key.as_str()) {
        LanguageCode::Japanese
    } else {
        LanguageCode::Chinese
    }
}
