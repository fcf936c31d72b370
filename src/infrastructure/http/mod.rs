pub mod request_id;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::controllers::{health, tts::TtsController};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::ModelRegistry;

pub use request_id::{request_id_middleware, X_REQUEST_ID};

/// Build the application router with all routes and layers
pub fn build_router(tts_controller: Arc<TtsController>, registry: Arc<ModelRegistry>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(registry);

    let tts_routes = Router::new()
        .route("/api/tts", post(TtsController::synthesize))
        .route("/api/tts/:filename", get(TtsController::download))
        .with_state(tts_controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Outermost first: the trace span wraps the request id and CORS handling
    Router::new().merge(health_routes).merge(tts_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware))
            .layer(cors),
    )
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
