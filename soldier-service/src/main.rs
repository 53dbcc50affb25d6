use service_core::observability::init_tracing;
use soldier_service::config::SoldierConfig;
use soldier_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level);

    let config = SoldierConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let db = app.db().clone();
    let result = app.run_until_stopped().await;

    tracing::info!("Server stopped, closing MongoDB connection");
    db.close().await;

    result
}
