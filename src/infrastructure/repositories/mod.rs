pub mod audio_file_repository;
pub mod model_registry;
pub mod tts_repository;
pub mod vits_config;
#[cfg(feature = "onnx")]
pub mod vits_tts_repository;

pub use audio_file_repository::{AudioFileRepository, StoredAudio};
pub use model_registry::{find_model_files, ModelAssets, ModelError, ModelLoader, ModelRegistry, ModelStatus};
pub use tts_repository::{SynthesisError, SynthesisOptions, TtsRepository};
#[cfg(feature = "onnx")]
pub use vits_tts_repository::{VitsModelLoader, VitsTtsRepository};
