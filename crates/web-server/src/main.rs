use std::net::SocketAddr;
use std::sync::Arc;

use aggregator::AnalysisEngine;

// This main function is the entry point when running `cargo run -p web-server`.
// It wires the engine from config.toml and serves the API; the usual entry
// point is the `limelight serve` command at the workspace root.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config()?;
    let _log_guard = configuration::init_tracing(config.logging.dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let engine = Arc::new(AnalysisEngine::from_config(config));
    web_server::run_server(addr, engine).await
}
