use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::domain::audio::SilenceParams;
use crate::domain::tts::PipelineSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,
    // Pipeline
    pub segment_pause_ms: u64,
    pub trim_silence_thresh_db: f32,
    pub trim_min_silence_ms: u64,
    pub trim_padding_ms: u64,
    // ONNX Runtime
    pub onnx_intra_threads: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            models_dir: env::var("MODELS_DIR")
                .unwrap_or_else(|_| "models".to_string())
                .into(),
            output_dir: env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "outputs".to_string())
                .into(),
            segment_pause_ms: env::var("SEGMENT_PAUSE_MS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            trim_silence_thresh_db: env::var("TRIM_SILENCE_THRESH_DB")
                .unwrap_or_else(|_| "-40".to_string())
                .parse()?,
            trim_min_silence_ms: env::var("TRIM_MIN_SILENCE_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()?,
            trim_padding_ms: env::var("TRIM_PADDING_MS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()?,
            onnx_intra_threads: env::var("ONNX_INTRA_THREADS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            segment_pause_ms: self.segment_pause_ms,
            silence: SilenceParams {
                silence_thresh_db: self.trim_silence_thresh_db,
                min_silence_ms: self.trim_min_silence_ms,
                keep_ms: self.trim_padding_ms,
                ..SilenceParams::default()
            },
        }
    }
}
