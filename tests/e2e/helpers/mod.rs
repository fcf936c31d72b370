use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tts_server::controllers::tts::TtsController;
use tts_server::domain::tts::{LanguageCode, PipelineSettings, TtsService};
use tts_server::infrastructure::http::build_router;
use tts_server::infrastructure::repositories::{
    AudioFileRepository, ModelAssets, ModelError, ModelLoader, ModelRegistry, SynthesisError,
    SynthesisOptions, TtsRepository,
};

pub mod api_client;

use api_client::TestClient;

pub const SAMPLE_RATE: u32 = 16_000;
/// Shortest input, in speakable characters, the fake model accepts
pub const MIN_SPEAKABLE_CHARS: usize = 2;
const SAMPLES_PER_CHAR: usize = 800;

/// Stand-in for a VITS model: a tone whose length follows the text
pub struct ToneModel;

impl TtsRepository for ToneModel {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<Vec<f32>, SynthesisError> {
        let speakable = text.chars().filter(|c| c.is_alphanumeric()).count();
        if speakable < MIN_SPEAKABLE_CHARS {
            return Err(SynthesisError::InputTooShort {
                tokens: speakable,
                min: MIN_SPEAKABLE_CHARS,
            });
        }

        let len = (speakable * SAMPLES_PER_CHAR) as f32 / options.speed;
        Ok((0..len as usize)
            .map(|i| 0.5 * (i as f32 * 440.0 * std::f32::consts::TAU / SAMPLE_RATE as f32).sin())
            .collect())
    }
}

#[derive(Default)]
pub struct ToneModelLoader {
    pub loads: AtomicUsize,
}

impl ModelLoader for ToneModelLoader {
    fn load(
        &self,
        _language: LanguageCode,
        _assets: &ModelAssets,
    ) -> Result<Arc<dyn TtsRepository>, ModelError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ToneModel))
    }
}

/// Install placeholder model files for a language
pub fn install_model(models_dir: &Path, language: &str) {
    let dir = models_dir.join(language);
    std::fs::create_dir_all(&dir).expect("Failed to create model dir");
    std::fs::write(dir.join("model_file.onnx"), b"onnx").expect("Failed to write checkpoint");
    std::fs::write(dir.join("config.json"), b"{}").expect("Failed to write config");
}

pub struct TestContext {
    pub client: TestClient,
    pub loader: Arc<ToneModelLoader>,
    pub models_dir: TempDir,
    pub output_dir: TempDir,
}

impl TestContext {
    /// Files currently in the output directory
    pub fn output_files(&self) -> Vec<String> {
        std::fs::read_dir(self.output_dir.path())
            .expect("Failed to read output dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            // zh and en are installed, ja is left missing
            let models_dir = tempfile::tempdir().expect("Failed to create models dir");
            install_model(models_dir.path(), "zh");
            install_model(models_dir.path(), "en");
            let output_dir = tempfile::tempdir().expect("Failed to create output dir");

            let loader = Arc::new(ToneModelLoader::default());
            let registry = Arc::new(ModelRegistry::new(models_dir.path(), loader.clone()));
            let audio_repo = Arc::new(
                AudioFileRepository::new(output_dir.path()).expect("Failed to open output dir"),
            );
            let tts_service = Arc::new(TtsService::new(
                registry.clone(),
                audio_repo.clone(),
                PipelineSettings::default(),
            ));
            let tts_controller = Arc::new(TtsController::new(tts_service, audio_repo));
            let app = build_router(tts_controller, registry);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                loader,
                models_dir,
                output_dir,
            }
        }
    }
}
