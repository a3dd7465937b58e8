//! Sitegate API server binary

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sitegate_api::{routes, AppState, Config, PgSiteStore};
use sitegate_shared::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(PgSiteStore::new(pool));
    let state = AppState::new(config.clone(), store);

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(
        bind_address = %config.bind_address,
        default_site_id = ?config.default_site_id,
        "sitegate listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
