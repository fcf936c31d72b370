/// Per-call synthesis settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOptions {
    /// Let the engine split the text into sentences and synthesize each one
    pub split_sentences: bool,
    /// Speaking-rate multiplier, 1.0 is the model's natural pace
    pub speed: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            split_sentences: false,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    /// The input is shorter than the model's receptive field
    #[error("input too short for the model: {tokens} tokens, need at least {min}")]
    InputTooShort { tokens: usize, min: usize },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// A loaded speech model bound to one language.
///
/// Implementations run inference synchronously on the calling thread;
/// callers are expected to invoke them from a blocking context.
pub trait TtsRepository: Send + Sync {
    /// Sample rate of the waveform returned by [`TtsRepository::synthesize`]
    fn sample_rate(&self) -> u32;

    /// Synthesize text into mono float samples
    ///
    /// # Errors
    /// `InputTooShort` when the text tokenizes to fewer tokens than the model
    /// accepts; `Inference` for any other runtime failure.
    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<Vec<f32>, SynthesisError>;
}
