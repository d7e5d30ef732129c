//! physiodb-extract - batch ETL for physiological sensor logs
//!
//! Walks a FatigueSet-style data directory and loads every recognized sensor
//! file into a SQLite database for physiodb-web to serve.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "physiodb-extract", about = "Extract sensor log files into a SQLite store")]
struct Args {
    /// Data root directory (<root>/<participant>/<session>/<sensor>.{csv,txt})
    data_root: PathBuf,

    /// Target SQLite database file (created if missing)
    #[arg(long, default_value = "physio.db")]
    database: PathBuf,
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
    info!(
        "Starting physiodb-extract v{}",
        env!("CARGO_PKG_VERSION")
    );

    let summary = physiodb_extract::extract_all(&args.data_root, &args.database).await?;

    info!(
        "Done: {} records loaded, {} files failed",
        summary.total_records, summary.files_failed
    );
    Ok(())
}
