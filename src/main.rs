use anyhow::Result;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod models;
mod services;

use services::{migrator::Migrator, s3_store::S3Store};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // --- Logging setup (stderr; stdout carries the move report) ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // --- Parse and validate args before touching the store ---
    let cfg = match config::AppConfig::from_args() {
        Ok(cfg) => cfg,
        Err(err) => {
            println!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!("Starting fingerprint rename with config: {:?}", cfg);

    // --- Initialize S3 client from the ambient AWS environment ---
    let store = S3Store::from_env().await;

    // --- Run the migration ---
    let migrator = Migrator::new(store, cfg);
    let report = migrator.migrate(&mut std::io::stdout()).await?;

    tracing::debug!("Migration report: {:?}", report);
    Ok(ExitCode::SUCCESS)
}
