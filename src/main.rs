// Main entry point - Dependency injection, CLI and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::coverage_service::CoverageService;
use crate::infrastructure::config::{load_app_config, AppConfig, DEFAULT_CONFIG_PATH};
use crate::infrastructure::dataset_fetcher::DatasetFetcher;
use crate::infrastructure::owid_repository::OwidFileRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{coverage, date_range, health_check};

#[derive(Parser)]
#[command(author, version, about = "Builds vaccination coverage maps", long_about = None)]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a coverage map and write it as JSON for the renderer
    Generate {
        /// Target date (YYYY-MM-DD), defaults to the newest available date
        #[arg(short, long)]
        date: Option<String>,
        /// "one" / "one dose" or "fully" / "fully vaccinated"
        #[arg(long, default_value = "one")]
        dose: String,
        /// "country" or "continent"
        #[arg(short, long, default_value = "country")]
        kind: String,
        /// Output file, overrides the configured path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the range of dates a map can be generated for
    LatestDate,
    /// Download the dataset when the local copy is missing or stale
    Update {
        #[arg(long)]
        force: bool,
    },
    /// Serve coverage maps over HTTP
    Serve,
}

async fn load_service(config: &AppConfig) -> anyhow::Result<CoverageService> {
    let repository = Arc::new(OwidFileRepository::new(
        config.data.dataset_path.clone(),
        config.data.translation_path.clone(),
        config.data.canonical_codes_path.clone(),
    ));

    CoverageService::load(
        repository,
        &config.data.reference_area,
        config.data.earliest_date()?,
    )
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vaxmap=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_app_config(&cli.config)?;

    match cli.command {
        Commands::Generate {
            date,
            dose,
            kind,
            output,
        } => {
            let service = load_service(&config).await?;
            let date =
                date.unwrap_or_else(|| service.latest_date().format("%Y-%m-%d").to_string());
            let selection = service.select(&date, &dose, &kind)?;

            let report = service.coverage(&selection);
            let path = output.unwrap_or_else(|| config.output.path.clone());
            let json = serde_json::to_string_pretty(&report)?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;

            tracing::info!("Wrote coverage map to {:?}", path);
        }
        Commands::LatestDate => {
            let service = load_service(&config).await?;
            println!(
                "{} .. {}",
                service.earliest_date().format("%Y-%m-%d"),
                service.latest_date().format("%Y-%m-%d")
            );
        }
        Commands::Update { force } => {
            let fetcher = DatasetFetcher::new(
                config.update.url.clone(),
                config.data.dataset_path.clone(),
                config.update.max_age_hours,
            );
            fetcher.refresh(force).await?;
        }
        Commands::Serve => {
            let coverage_service = load_service(&config).await?;
            let state = Arc::new(AppState { coverage_service });

            let router = Router::new()
                .route("/healthz", get(health_check))
                .route("/latest-date", get(date_range))
                .route("/coverage", get(coverage))
                .layer(TraceLayer::new_for_http())
                .with_state(state);

            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .context("Invalid server address")?;
            tracing::info!("Starting vaxmap service on {}", addr);

            axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;
        }
    }

    Ok(())
}
