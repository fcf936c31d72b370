use super::model_registry::{ModelAssets, ModelError, ModelLoader};
use super::tts_repository::{SynthesisError, SynthesisOptions, TtsRepository};
use super::vits_config::{ModelArgs, VitsConfig, VitsTokenizer};
use crate::domain::tts::{segmentation::split_sentences, LanguageCode};
use ndarray::{Array1, Array2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::sync::Arc;

/// Zero samples appended after each sentence when the engine splits text
const SENTENCE_TAIL_SAMPLES: usize = 10_000;

/// VITS model exported to ONNX, run through ONNX Runtime
pub struct VitsTtsRepository {
    session: Session,
    tokenizer: VitsTokenizer,
    scales: ModelArgs,
    sample_rate: u32,
    min_input_tokens: usize,
}

impl VitsTtsRepository {
    pub fn load(assets: &ModelAssets, intra_threads: usize) -> Result<Self, ModelError> {
        let config = VitsConfig::from_file(&assets.config)
            .map_err(|e| ModelError::Load(format!("invalid config {}: {}", assets.config.display(), e)))?;
        // Grapheme tokenizer only
        if config.use_phonemes {
            return Err(ModelError::Load("phoneme-based models are not supported".to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Load(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Load(e.to_string()))?
            .with_intra_threads(intra_threads)
            .map_err(|e| ModelError::Load(e.to_string()))?
            .commit_from_file(&assets.checkpoint)
            .map_err(|e| ModelError::Load(e.to_string()))?;

        Ok(Self {
            session,
            tokenizer: VitsTokenizer::from_config(&config),
            scales: config.model_args,
            sample_rate: config.audio.sample_rate,
            min_input_tokens: config.min_input_tokens(),
        })
    }

    fn infer(&self, text: &str, speed: f32) -> Result<Vec<f32>, SynthesisError> {
        let ids = self.tokenizer.encode(text);
        if ids.len() < self.min_input_tokens {
            return Err(SynthesisError::InputTooShort {
                tokens: ids.len(),
                min: self.min_input_tokens,
            });
        }

        let token_count = ids.len();
        let input = Array2::from_shape_vec((1, token_count), ids)
            .map_err(|e| SynthesisError::Inference(e.to_string()))?;
        let input_lengths = Array1::from_vec(vec![token_count as i64]);
        let scales = Array1::from_vec(vec![
            self.scales.inference_noise_scale,
            self.scales.length_scale / speed,
            self.scales.inference_noise_scale_dp,
        ]);

        let inputs = ort::inputs![
            "input" => input.view(),
            "input_lengths" => input_lengths.view(),
            "scales" => scales.view(),
        ]
        .map_err(|e| SynthesisError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| classify_runtime_error(e.to_string(), token_count, self.min_input_tokens))?;

        let audio = outputs
            .get("output")
            .ok_or_else(|| SynthesisError::Inference("missing output tensor".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| SynthesisError::Inference(e.to_string()))?;

        Ok(audio.iter().copied().collect())
    }
}

/// Convolutions reject sequences shorter than their kernel; surface that as
/// a too-short input rather than a generic failure.
fn classify_runtime_error(message: String, tokens: usize, min: usize) -> SynthesisError {
    if message.to_lowercase().contains("kernel size") {
        SynthesisError::InputTooShort { tokens, min }
    } else {
        SynthesisError::Inference(message)
    }
}

impl TtsRepository for VitsTtsRepository {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<Vec<f32>, SynthesisError> {
        let start_time = std::time::Instant::now();

        let sentences = if options.split_sentences {
            split_sentences(text)
        } else {
            vec![text.to_string()]
        };

        let mut waveform = Vec::new();
        for sentence in &sentences {
            waveform.extend(self.infer(sentence, options.speed)?);
            if options.split_sentences {
                waveform.extend(std::iter::repeat(0.0).take(SENTENCE_TAIL_SAMPLES));
            }
        }

        tracing::debug!(
            provider = "vits-onnx",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            sentence_count = sentences.len(),
            sample_count = waveform.len(),
            "Inference completed"
        );

        Ok(waveform)
    }
}

/// Loads VITS ONNX models from disk
pub struct VitsModelLoader {
    intra_threads: usize,
}

impl VitsModelLoader {
    pub fn new(intra_threads: usize) -> Self {
        Self { intra_threads }
    }
}

impl ModelLoader for VitsModelLoader {
    fn load(
        &self,
        language: LanguageCode,
        assets: &ModelAssets,
    ) -> Result<Arc<dyn TtsRepository>, ModelError> {
        tracing::debug!(lang = %language, intra_threads = self.intra_threads, "Creating ONNX session");
        Ok(Arc::new(VitsTtsRepository::load(assets, self.intra_threads)?))
    }
}
