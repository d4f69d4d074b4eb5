use std::net::SocketAddr;
use std::path::Path;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gym_manager_backend::db::DbConnection;
use gym_manager_backend::import;
use gym_manager_backend::rest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Setting up database");
    let db = DbConnection::init().await?;

    // Seed batches are optional; without a directory the store starts empty
    if let Ok(dir) = std::env::var("GYM_IMPORT_DIR") {
        import::run_seed_import(&db, Path::new(&dir)).await;
    }

    // CORS setup to allow the dashboard to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let state = rest::AppState::new(db);
    let app = rest::router(state).layer(cors);

    let addr: SocketAddr = std::env::var("GYM_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
