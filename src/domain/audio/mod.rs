pub mod silence;
pub mod wav;

pub use silence::{detect_nonsilent, AudioBuffer, SilenceParams};
pub use wav::{read_wav, trim_wav_silence, write_wav};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
