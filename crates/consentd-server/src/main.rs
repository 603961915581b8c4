//! Consentd Server binary.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use consentd_server::{AppState, StateSettings, run_server_with_state};
use consentd_store::{MemoryStore, ensure_default_consent_types};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get server configuration from environment
    let host = std::env::var("CONSENTD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("CONSENTD_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .expect("CONSENTD_PORT must be a valid port number");

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid address");

    let settings = StateSettings {
        consent_type_ttl: Duration::from_secs(env_u64("CONSENT_TYPE_TTL_SEC", 3600)),
        user_state_ttl: Duration::from_secs(env_u64("USER_STATE_TTL_SEC", 300)),
        cache_capacity: env_u64("CONSENTD_CACHE_CAPACITY", 10_000),
    };

    tracing::info!("Starting Consentd Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Cache TTLs: consent types {}s, user state {}s",
        settings.consent_type_ttl.as_secs(),
        settings.user_state_ttl.as_secs()
    );

    // Initialize metrics
    let prometheus_handle = consentd_server::metrics::init_metrics();

    // Set up storage and seed the default consent types
    let store = Arc::new(MemoryStore::new());
    ensure_default_consent_types(store.as_ref()).await?;

    let state = AppState::new(store.clone(), store.clone(), store, settings);

    // Run server
    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .unwrap_or_else(|_| panic!("{} must be a positive integer", name)),
        Err(_) => default,
    }
}
