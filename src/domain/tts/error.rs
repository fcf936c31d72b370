use crate::error::AppError;
use crate::infrastructure::repositories::ModelError;

/// Shown when no part of the text could be synthesized
pub const CANNOT_PROCESS_MESSAGE: &str =
    "The model cannot process this text: it is too short or has no speakable characters";

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{}", CANNOT_PROCESS_MESSAGE)]
    CannotProcess,
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::CannotProcess => AppError::BadRequest(CANNOT_PROCESS_MESSAGE.to_string()),
            TtsServiceError::ModelUnavailable(e) => AppError::Internal(e.to_string()),
            TtsServiceError::Synthesis(msg) | TtsServiceError::Storage(msg) => AppError::Internal(msg),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
