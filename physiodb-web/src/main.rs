//! physiodb-web - read-only browser and query API for the sensor store

use anyhow::Result;
use clap::Parser;
use physiodb_web::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "physiodb-web", about = "Serve a query API and browser UI over a sensor store")]
struct Args {
    /// SQLite database file produced by physiodb-extract
    #[arg(long, default_value = "physio.db")]
    database: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting physiodb-web v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", args.database.display());

    let pool = match physiodb_common::db::connect_readonly(&args.database).await {
        Ok(pool) => {
            info!("Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("physiodb-web listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
