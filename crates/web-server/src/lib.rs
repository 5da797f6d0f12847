use aggregator::AnalysisEngine;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};
use tracing;

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}

/// The main function to configure and run the web server.
///
/// The engine is built by the caller so that the CLI and the server share one
/// snapshot store.
pub async fn run_server(addr: SocketAddr, engine: Arc<AnalysisEngine>) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState { engine });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/analysis/latest", get(handlers::get_latest_analysis))
        .route("/api/analysis/rebuild", post(handlers::rebuild_analysis))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every
        // incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
