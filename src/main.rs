use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_server::controllers::tts::TtsController;
use tts_server::domain::tts::TtsService;
use tts_server::infrastructure::config::{Config, LogFormat};
use tts_server::infrastructure::http::{build_router, start_http_server};
use tts_server::infrastructure::repositories::{AudioFileRepository, ModelRegistry, VitsModelLoader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTS server on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        models_dir = %config.models_dir.display(),
        output_dir = %config.output_dir.display(),
        segment_pause_ms = config.segment_pause_ms,
        onnx_intra_threads = config.onnx_intra_threads,
        "Configuration loaded"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    let audio_repo = Arc::new(AudioFileRepository::new(&config.output_dir)?);
    let loader = Arc::new(VitsModelLoader::new(config.onnx_intra_threads));
    let registry = Arc::new(ModelRegistry::new(&config.models_dir, loader));

    for language in tts_server::domain::tts::LanguageCode::ALL {
        tracing::info!(
            lang = %language,
            status = ?registry.status(language),
            "Model status"
        );
    }

    // 2. Instantiate services (models load lazily on first request)
    let tts_service = Arc::new(TtsService::new(
        registry.clone(),
        audio_repo.clone(),
        config.pipeline_settings(),
    ));

    // 3. Instantiate controllers
    let tts_controller = Arc::new(TtsController::new(tts_service, audio_repo));

    let app = build_router(tts_controller, registry);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_server=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_server=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
