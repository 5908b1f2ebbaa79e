use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{app, state::{AppState, AuthConfig}};
use wayfare_core::search::SearchEngine;
use wayfare_core::store::UserStore;
use wayfare_core::supplier::TravelSupplier;
use wayfare_store::app_config::{Config, StoreBackend};
use wayfare_store::{MemoryStore, RedisStore};
use wayfare_supplier::AmadeusClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    // User store backend
    let store: Arc<dyn UserStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            let url = config
                .store
                .redis_url
                .as_deref()
                .expect("store.redis_url is required for the redis backend");
            let redis_store = RedisStore::new(url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Using Redis store");
            Arc::new(redis_store)
        }
    };

    // Upstream travel data supplier
    let supplier: Arc<dyn TravelSupplier> = Arc::new(AmadeusClient::new(
        &config.amadeus.base_url,
        &config.amadeus.api_key,
        &config.amadeus.api_secret,
    ));

    let engine = Arc::new(SearchEngine::new(
        supplier,
        store.clone(),
        config.search.fallback_currency.clone(),
    ));

    let app_state = AppState {
        store,
        engine,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            remember_expiration: config.auth.remember_expiration_seconds,
            password_salt: config.auth.password_salt.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
