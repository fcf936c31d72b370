use crate::domain::audio::{write_wav, AudioError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A WAV file written to the output directory
#[derive(Debug, Clone)]
pub struct StoredAudio {
    pub file_name: String,
    pub path: PathBuf,
}

/// Generated WAV files on local disk. Files are never deleted.
pub struct AudioFileRepository {
    output_dir: PathBuf,
}

impl AudioFileRepository {
    /// Open the output directory, creating it if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `tts_{unix_seconds}_{8 hex chars}.wav`
    fn generate_file_name() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("tts_{}_{}.wav", Utc::now().timestamp(), &id[..8])
    }

    /// Persist a waveform under a fresh file name
    pub fn save(&self, samples: &[f32], sample_rate: u32) -> Result<StoredAudio, AudioError> {
        let file_name = Self::generate_file_name();
        let path = self.output_dir.join(&file_name);

        if let Err(e) = write_wav(&path, samples, sample_rate) {
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        tracing::info!(
            file = %file_name,
            sample_rate = sample_rate,
            sample_count = samples.len(),
            "Audio file written"
        );

        Ok(StoredAudio { file_name, path })
    }

    /// Path of an existing output file. Names that could escape the output
    /// directory resolve to nothing.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) {
            return None;
        }
        let path = self.output_dir.join(file_name);
        path.is_file().then_some(path)
    }

    /// Open a generated file for streaming, with its length.
    /// `None` if it does not exist.
    pub async fn open(&self, file_name: &str) -> std::io::Result<Option<(tokio::fs::File, u64)>> {
        let Some(path) = self.resolve(file_name) else {
            return Ok(None);
        };
        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                let len = file.metadata().await?.len();
                Ok(Some((file, len)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
