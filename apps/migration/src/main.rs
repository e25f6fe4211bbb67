//! Migration CLI for the Quill schema (`up`, `down`, `status`, `fresh`, ...).

use sea_orm_migration::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Running Quill schema migrations");
    cli::run_cli(migration::Migrator).await;
}
