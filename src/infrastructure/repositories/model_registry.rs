use super::tts_repository::TtsRepository;
use crate::domain::tts::LanguageCode;
use moka::future::Cache;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Checkpoint names accepted in a model directory, in lookup order
const CHECKPOINT_NAMES: &[&str] = &["model_file.onnx", "model.onnx"];
const CONFIG_NAME: &str = "config.json";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("offline model directory does not exist: {0}")]
    DirectoryMissing(PathBuf),
    #[error("offline model directory is missing required files: {0} (need model_file.onnx and config.json)")]
    FilesMissing(PathBuf),
    #[error("failed to load model: {0}")]
    Load(String),
}

/// The two files that make up an offline model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAssets {
    pub checkpoint: PathBuf,
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Loaded,
    Available,
    Missing,
}

/// Builds a model from its assets. Called at most once per language while
/// the load succeeds.
pub trait ModelLoader: Send + Sync {
    fn load(
        &self,
        language: LanguageCode,
        assets: &ModelAssets,
    ) -> Result<Arc<dyn TtsRepository>, ModelError>;
}

/// Locate the checkpoint and config inside a model directory
pub fn find_model_files(model_dir: &Path) -> Result<ModelAssets, ModelError> {
    if !model_dir.is_dir() {
        return Err(ModelError::DirectoryMissing(model_dir.to_path_buf()));
    }

    let checkpoint = CHECKPOINT_NAMES
        .iter()
        .map(|name| model_dir.join(name))
        .find(|candidate| candidate.is_file());
    let config = model_dir.join(CONFIG_NAME);

    match checkpoint {
        Some(checkpoint) if config.is_file() => Ok(ModelAssets { checkpoint, config }),
        _ => Err(ModelError::FilesMissing(model_dir.to_path_buf())),
    }
}

/// Process-wide cache of loaded models, keyed by language.
///
/// Entries never expire. Concurrent first requests for the same language
/// share a single load; a failed load is not cached.
pub struct ModelRegistry {
    models_dir: PathBuf,
    loader: Arc<dyn ModelLoader>,
    cache: Cache<LanguageCode, Arc<dyn TtsRepository>>,
}

impl ModelRegistry {
    pub fn new(models_dir: impl Into<PathBuf>, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            models_dir: models_dir.into(),
            loader,
            cache: Cache::builder().build(),
        }
    }

    pub fn model_dir(&self, language: LanguageCode) -> PathBuf {
        self.models_dir.join(language.as_str())
    }

    /// Get the model for a language, loading it on first use
    pub async fn get(
        &self,
        language: LanguageCode,
    ) -> Result<(Arc<dyn TtsRepository>, LanguageCode), ModelError> {
        let model_dir = self.model_dir(language);
        let loader = self.loader.clone();

        let model = self
            .cache
            .try_get_with(language, async move {
                let assets = find_model_files(&model_dir)?;
                tracing::info!(
                    lang = %language,
                    checkpoint = %assets.checkpoint.display(),
                    config = %assets.config.display(),
                    "Loading offline model"
                );

                let start_time = std::time::Instant::now();
                let model = tokio::task::spawn_blocking(move || loader.load(language, &assets))
                    .await
                    .map_err(|e| ModelError::Load(format!("loader task failed: {}", e)))??;

                tracing::info!(
                    lang = %language,
                    sample_rate = model.sample_rate(),
                    latency_ms = start_time.elapsed().as_millis(),
                    "Model loaded and cached"
                );
                Ok::<_, ModelError>(model)
            })
            .await
            .map_err(|e| {
                tracing::error!(lang = %language, error = %e, "Model load failed");
                (*e).clone()
            })?;

        Ok((model, language))
    }

    pub fn status(&self, language: LanguageCode) -> ModelStatus {
        if self.cache.contains_key(&language) {
            ModelStatus::Loaded
        } else if find_model_files(&self.model_dir(language)).is_ok() {
            ModelStatus::Available
        } else {
            ModelStatus::Missing
        }
    }
}
