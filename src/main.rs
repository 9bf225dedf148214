//! CommGuard - Real-time compliance monitoring for workplace communications
//!
//! CLI entry point: serve the monitor API, check a single message from the
//! command line, or print configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commguard::{
    config::MonitorConfig,
    detector::build_registry,
    engine::DecisionEngine,
    handler::{monitor_router, MonitorResponse, MonitorState},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "commguard")]
#[command(author = "CommGuard Team")]
#[command(version)]
#[command(about = "Real-time compliance monitoring for workplace communications")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COMMGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the monitor API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Evaluate a single message and print the assessment as JSON
    Check {
        /// Message text to evaluate
        #[arg(short, long)]
        message: String,

        /// Sender role
        #[arg(short, long, default_value = "unknown")]
        role: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("commguard={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
    } else {
        MonitorConfig::default()
    };

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Check { message, role } => check(config, &message, &role).await,
        Commands::Config { default } => {
            let config = if default {
                MonitorConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Run the monitor API server until interrupted.
async fn serve(config: MonitorConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let engine = build_engine(&config)?;
    tracing::info!(
        detectors = ?engine.detector_names(),
        deadline_ms = config.engine.deadline_ms,
        "starting monitor API"
    );

    let app = monitor_router(MonitorState { engine });
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Evaluate one message and print the wire-format assessment.
async fn check(config: MonitorConfig, message: &str, role: &str) -> Result<()> {
    let engine = build_engine(&config)?;
    let assessment = engine.evaluate(message, role).await?;
    let response: MonitorResponse = assessment.into();
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn build_engine(config: &MonitorConfig) -> Result<Arc<DecisionEngine>> {
    let registry = build_registry(&config.detectors)?;
    Ok(Arc::new(DecisionEngine::new(
        registry,
        config.engine.clone(),
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
