//! mlib-web - music library user account server
//!
//! Resolves the root folder, opens (or creates) `mlib.db` inside it and
//! serves the `/user/*` pages.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mlib_common::config::ServerConfig;
use mlib_common::db::init_database;
use mlib_web::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mlib-web")]
#[command(about = "Music library web server", long_about = None)]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MLIB_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "MLIB_BIND")]
    bind: Option<String>,

    /// Folder holding mlib.db (falls back to MLIB_ROOT_FOLDER, then config.toml)
    #[arg(short, long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlib_web=debug,mlib_common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting mlib-web v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::resolve(
        args.root_folder.as_deref(),
        "MLIB_ROOT_FOLDER",
        args.bind.as_deref(),
        args.port,
    )
    .context("Failed to resolve configuration")?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let app = build_router(AppState::new(pool, config.session_ttl));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("mlib-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
