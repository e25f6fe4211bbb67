//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use migration::{Migrator, MigratorTrait};
use quill_infra::DatabaseConnections;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestContextMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;

    let connections = DatabaseConnections::init(&config.database)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            std::io::Error::other(e)
        })?;

    if config.run_migrations {
        Migrator::up(&connections.main, None).await.map_err(|e| {
            tracing::error!("Failed to apply migrations: {}", e);
            std::io::Error::other(e)
        })?;
        tracing::info!("Migrations applied");
    }

    let state = AppState::new(connections.main.clone(), config.write_timeout);

    tracing::info!(
        service = %telemetry.service_name,
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(RequestContextMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .client_request_timeout(config.read_timeout)
    .client_disconnect_timeout(config.write_timeout)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    if let Err(e) = connections.close().await {
        tracing::warn!("Failed to close database connections: {}", e);
    }
    tracing::info!("Server stopped");
    Ok(())
}
