use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::{
    domain::tts::{TtsRequest, TtsResponse, TtsService, TtsServiceApi},
    error::{AppError, AppResult},
    infrastructure::repositories::AudioFileRepository,
};

pub struct TtsController {
    tts_service: Arc<TtsService>,
    audio_repo: Arc<AudioFileRepository>,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>, audio_repo: Arc<AudioFileRepository>) -> Self {
        Self {
            tts_service,
            audio_repo,
        }
    }

    /// POST /api/tts - Synthesize text into a WAV file
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<TtsRequest>,
    ) -> AppResult<Json<TtsResponse>> {
        let result = controller
            .tts_service
            .synthesize(request.text, request.lang, request.speed)
            .await?;

        Ok(Json(TtsResponse {
            file: result.file_name,
            lang: result.language,
        }))
    }

    /// GET /api/tts/:filename - Stream a generated file
    pub async fn download(
        State(controller): State<Arc<TtsController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let (file, len) = controller
            .audio_repo
            .open(&filename)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|_| AppError::NotFound("File not found".to_string()))?;
        headers.insert(header::CONTENT_DISPOSITION, disposition);

        Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))))
    }
}
