use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use market_pulse::config::Config;
use market_pulse::routes::build_router;
use market_pulse::state::AppState;
use market_pulse::store::{CloudantStore, DocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("market_pulse={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Market Pulse API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the document store (fatal if Cloudant credentials are missing)
    let cloudant = config.cloudant()?;
    let store = CloudantStore::new(&cloudant)?;
    store.ensure_database().await?;
    info!("Cloudant store ready (db: {})", store.db_name());

    let state = AppState {
        store: Arc::new(store),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // hackathon dashboard calls from anywhere

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
