//! cmdanno-web - Annotation collection service
//!
//! Web tool for collecting natural-language descriptions of command-line
//! invocations observed on curated web pages. Annotators browse pages by
//! utility, submit (url, nl, command) triples, and track completion.

use anyhow::Result;
use clap::Parser;
use cmdanno_common::config::{resolve_data_folder, AppConfig};
use cmdanno_common::db::init_database;
use cmdanno_web::{build_router, import, AppState};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "cmdanno-web", about = "NL-to-command annotation collection service")]
struct Cli {
    /// Data folder holding the database and config.toml
    #[arg(long)]
    data_folder: Option<String>,

    /// Tab-separated utility/url corpus file to import before serving
    #[arg(long)]
    import: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database delays
    info!(
        "Starting cmdanno annotation service (cmdanno-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    let data_folder = resolve_data_folder(
        cli.data_folder.as_deref(),
        "CMDANNO_DATA",
        Some("data_folder"),
    )?;
    std::fs::create_dir_all(&data_folder)?;

    let config = AppConfig::load(&data_folder)?;

    let db_path = data_folder.join("cmdanno.db");
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    if let Some(corpus) = &cli.import {
        let summary = import::load_corpus(&pool, corpus).await?;
        info!(
            "Imported corpus {}: {} associations ({} lines skipped)",
            corpus.display(),
            summary.associations,
            summary.skipped
        );
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("cmdanno-web listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
