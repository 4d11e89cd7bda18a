use std::sync::Arc;

use backend::{
    AppState,
    config::Config,
    create_router,
    database::Database,
    geocode::GeocodeCache,
    provider::GoogleMapsClient,
    store::{MemoryRouteStore, RouteStore},
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let store: Arc<dyn RouteStore> = match &config.database_url {
        Some(url) => {
            let db = Database::connect(url).await?;
            db.migrate().await?;
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, saved routes are kept in memory");
            Arc::new(MemoryRouteStore::default())
        }
    };

    let state = AppState {
        provider: Arc::new(GoogleMapsClient::new(
            config.google_api_key.clone(),
            config.geocode_region.clone(),
        )),
        store,
        geocode_cache: Arc::new(GeocodeCache::new(
            config.geocode_cache_size,
            config.geocode_cache_ttl(),
        )),
    };
    let app = create_router(state);

    tracing::info!("starting backend on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
