use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use workshophub::{AppState, Config, build_router, services::storage::FileStorageService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("workshophub=info,tower_http=info")),
        )
        .init();

    let config = Config::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database.connection_string().expose_secret())
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let storage = FileStorageService::new(&config.storage.root);
    storage.init().await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(pool, storage, config);
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown signal handler");
    }
}
