//! Budget approval platform API server.
//!
//! Main entry point for the backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bap_api::{AppState, create_router};
use bap_core::document::{DocumentStore, DocumentStoreConfig};
use bap_db::connect_with;
use bap_shared::{AppConfig, jwt::JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(max_connections = config.database.max_connections, "Connected to database");

    let documents = DocumentStore::from_config(DocumentStoreConfig::from(&config.storage))
        .context("failed to initialise document store")?;
    info!(
        root = %config.storage.root.display(),
        max_document_bytes = config.storage.max_document_bytes,
        "Document store configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
        documents,
        import: Arc::new(config.import.clone()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
