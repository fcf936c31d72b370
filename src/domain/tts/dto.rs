use super::language::LanguageCode;
use serde::{Deserialize, Serialize};

/// Request for POST /api/tts
#[derive(Debug, Serialize, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    /// Language hint, e.g. "zh", "en-US", "japanese"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// Response for POST /api/tts
#[derive(Debug, Serialize, Deserialize)]
pub struct TtsResponse {
    pub file: String,
    pub lang: LanguageCode,
}
