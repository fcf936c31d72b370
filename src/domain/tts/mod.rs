pub mod dto;
pub mod error;
pub mod language;
pub mod segmentation;
pub mod service;

pub use dto::{TtsRequest, TtsResponse};
pub use error::TtsServiceError;
pub use language::{normalize_lang, LanguageCode};
pub use segmentation::{split_sentences, split_zh_sentences};
pub use service::{PipelineSettings, TtsService, TtsServiceApi, TtsSynthesisResult};
