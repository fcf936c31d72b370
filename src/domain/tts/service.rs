use super::error::TtsServiceError;
use super::language::{normalize_lang, LanguageCode};
use super::segmentation::split_zh_sentences;
use crate::domain::audio::{trim_wav_silence, SilenceParams};
use crate::infrastructure::repositories::{
    AudioFileRepository, ModelRegistry, SynthesisError, SynthesisOptions, TtsRepository,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct TtsSynthesisResult {
    pub file_name: String,
    pub language: LanguageCode,
}

/// Tunables for the synthesis pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Silence inserted between Chinese segments
    pub segment_pause_ms: u64,
    pub silence: SilenceParams,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            segment_pause_ms: 300,
            silence: SilenceParams::default(),
        }
    }
}

pub struct TtsService {
    registry: Arc<ModelRegistry>,
    audio_repo: Arc<AudioFileRepository>,
    settings: PipelineSettings,
}

impl TtsService {
    pub fn new(
        registry: Arc<ModelRegistry>,
        audio_repo: Arc<AudioFileRepository>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            registry,
            audio_repo,
            settings,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize text to a WAV file in the output directory
    ///
    /// This operation:
    /// - Validates the text and speed
    /// - Resolves the language hint and fetches (or loads) its model
    /// - Runs segmentation and inference on a blocking thread
    /// - Writes the WAV file and trims its leading/trailing silence
    ///
    /// Returns the generated file name and the language actually used
    async fn synthesize(
        &self,
        text: String,
        lang: Option<String>,
        speed: Option<f32>,
    ) -> Result<TtsSynthesisResult, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize(
        &self,
        text: String,
        lang: Option<String>,
        speed: Option<f32>,
    ) -> Result<TtsSynthesisResult, TtsServiceError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(TtsServiceError::Invalid("Text cannot be empty".to_string()));
        }
        let speed = validate_speed(speed)?;
        let language = normalize_lang(lang.as_deref());

        tracing::info!(
            requested_lang = lang.as_deref().unwrap_or(""),
            lang = %language,
            text_length = text.chars().count(),
            speed = speed,
            "TTS synthesis request"
        );

        let (model, language) = self.registry.get(language).await?;

        let audio_repo = self.audio_repo.clone();
        let settings = self.settings;
        tokio::task::spawn_blocking(move || {
            run_pipeline(model.as_ref(), &audio_repo, &settings, language, &text, speed)
        })
        .await
        .map_err(|e| TtsServiceError::Other(anyhow::anyhow!("synthesis task failed: {}", e)))?
    }
}

fn validate_speed(speed: Option<f32>) -> Result<f32, TtsServiceError> {
    let speed = speed.unwrap_or(1.0);
    if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(TtsServiceError::Invalid(format!(
            "Speed must be between {} and {}",
            MIN_SPEED, MAX_SPEED
        )));
    }
    Ok(speed)
}

fn run_pipeline(
    model: &dyn TtsRepository,
    audio_repo: &AudioFileRepository,
    settings: &PipelineSettings,
    language: LanguageCode,
    text: &str,
    speed: f32,
) -> Result<TtsSynthesisResult, TtsServiceError> {
    let start_time = std::time::Instant::now();

    let waveform = render_waveform(model, language, text, speed, settings.segment_pause_ms)?;
    let stored = audio_repo
        .save(&waveform, model.sample_rate())
        .map_err(|e| TtsServiceError::Storage(e.to_string()))?;

    trim_silence_best_effort(&stored.path, &settings.silence);

    tracing::info!(
        lang = %language,
        file = %stored.file_name,
        latency_ms = start_time.elapsed().as_millis(),
        audio_secs = waveform.len() as f32 / model.sample_rate().max(1) as f32,
        "TTS synthesis completed"
    );

    Ok(TtsSynthesisResult {
        file_name: stored.file_name,
        language,
    })
}

/// Trimming is cosmetic; a failure keeps the untrimmed file.
fn trim_silence_best_effort(path: &Path, params: &SilenceParams) {
    if let Err(e) = trim_wav_silence(path, params) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Silence trimming failed, keeping untrimmed audio"
        );
    }
}

/// Produce the full waveform for `text` in `language`.
///
/// Chinese text is segmented here and each sentence synthesized on its own,
/// skipping sentences the model rejects as too short. Other languages go to
/// the engine in one call, with sentence splitting left to the engine.
pub fn render_waveform(
    model: &dyn TtsRepository,
    language: LanguageCode,
    text: &str,
    speed: f32,
    segment_pause_ms: u64,
) -> Result<Vec<f32>, TtsServiceError> {
    match language {
        LanguageCode::Chinese => {
            let segments = split_zh_sentences(text);
            render_segments(model, &segments, speed, segment_pause_ms)
        }
        LanguageCode::English | LanguageCode::Japanese => {
            let options = SynthesisOptions {
                split_sentences: language.uses_engine_segmentation(),
                speed,
            };
            model.synthesize(text, &options).map_err(|e| match e {
                SynthesisError::InputTooShort { tokens, min } => {
                    tracing::warn!(lang = %language, tokens, min, "Text too short for model");
                    TtsServiceError::CannotProcess
                }
                SynthesisError::Inference(msg) => TtsServiceError::Synthesis(msg),
            })
        }
    }
}

fn render_segments(
    model: &dyn TtsRepository,
    segments: &[String],
    speed: f32,
    segment_pause_ms: u64,
) -> Result<Vec<f32>, TtsServiceError> {
    let options = SynthesisOptions {
        split_sentences: false,
        speed,
    };
    let pause_len = (model.sample_rate() as u64 * segment_pause_ms / 1000) as usize;

    let mut waveform = Vec::new();
    let mut synthesized = 0usize;
    for (index, segment) in segments.iter().enumerate() {
        match model.synthesize(segment, &options) {
            Ok(samples) => {
                if synthesized > 0 {
                    waveform.extend(std::iter::repeat(0.0).take(pause_len));
                }
                waveform.extend(samples);
                synthesized += 1;
            }
            Err(SynthesisError::InputTooShort { tokens, min }) => {
                tracing::warn!(
                    segment_index = index,
                    segment = %segment,
                    tokens,
                    min,
                    "Segment too short for model, skipping"
                );
            }
            Err(SynthesisError::Inference(msg)) => return Err(TtsServiceError::Synthesis(msg)),
        }
    }

    tracing::debug!(
        segment_count = segments.len(),
        synthesized = synthesized,
        skipped = segments.len() - synthesized,
        "Segments synthesized"
    );

    if synthesized == 0 {
        return Err(TtsServiceError::CannotProcess);
    }
    Ok(waveform)
}
