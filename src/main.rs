use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use aggregator::AnalysisEngine;
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::Snapshot;

/// The main entry point for the Limelight analysis application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load API keys and other secrets from the .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config()?;
    let _log_guard = configuration::init_tracing(config.logging.dir.as_deref());

    match cli.command {
        Commands::Rebuild(args) => handle_rebuild(args, config).await,
        Commands::Serve(args) => handle_serve(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Prediction-market analysis for the shows on a streaming-ranking event.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full analysis pass and print the ranked result.
    Rebuild(RebuildArgs),
    /// Serve the analysis API over HTTP.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct RebuildArgs {
    /// Skip exporting the snapshot JSON into the data directory.
    #[arg(long)]
    no_save: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Rebuild Command Logic
// ==============================================================================

/// Runs a single rebuild, renders the ranked table and exports the snapshot.
async fn handle_rebuild(args: RebuildArgs, config: configuration::Config) -> anyhow::Result<()> {
    let data_dir = config.snapshot.data_dir.clone();
    let engine = AnalysisEngine::from_config(config);

    let snapshot = engine.rebuild_snapshot().await?;
    print_snapshot(&snapshot);

    if !args.no_save {
        // Export failures are logged, never fatal: the snapshot already
        // printed and remains readable in-process.
        if let Err(e) = export_snapshot(&snapshot, &data_dir) {
            tracing::error!(error = %e, "Failed to export snapshot JSON.");
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    let mut table = Table::new();
    table.set_header(vec![
        "#", "Show", "Composite", "Implied", "Fair", "Edge", "Call",
    ]);

    for (rank, record) in snapshot.shows.iter().enumerate() {
        let implied = record
            .market
            .implied_chance
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            (rank + 1).to_string(),
            record.show_name.clone(),
            record.score.composite_score.to_string(),
            implied,
            record.score.fair_price.to_string(),
            record.score.edge_points.to_string(),
            record.score.recommendation.to_string(),
        ]);
    }

    println!("Analysis generated at {}", snapshot.generated_at);
    println!("{table}");
}

/// Writes the snapshot as a timestamped JSON file into the data directory.
fn export_snapshot(snapshot: &Snapshot, data_dir: &std::path::Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;
    let filename = format!(
        "analysis-snapshot-{}.json",
        Utc::now().format("%Y%m%dT%H%M%SZ")
    );
    let path = data_dir.join(filename);
    fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
    tracing::info!(path = %path.display(), "Exported snapshot.");
    Ok(())
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: configuration::Config) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let engine = Arc::new(AnalysisEngine::from_config(config));
    web_server::run_server(addr, engine).await
}
