use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartrent_backend::{
    build_router,
    config::Config,
    middleware::AppState,
    store::{memory::InMemoryStore, postgres::PostgresStore, RentalStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartrent_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("JWT_SECRET must be set")?;

    tracing::info!("Starting SmartRent Backend...");

    let store: Arc<dyn RentalStore> = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = PostgresStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    if config.reconcile_on_startup {
        let corrected = store
            .reconcile_availability(None)
            .await
            .context("availability reconciliation failed")?;
        tracing::info!(corrected, "Availability flags reconciled");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST/PORT do not form a socket address")?;

    let state = AppState {
        store,
        config: config.clone(),
    };
    let app = build_router(state);

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
