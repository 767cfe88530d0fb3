//! Example server: loads config from env, picks PostgreSQL when `DATABASE_URL` is set
//! (in-memory otherwise), mounts common routes and the `/api/v1` API.

use birdwatch::{
    api_routes, common_routes_with_ready, load_from_env, AppState, EntityStore, InMemoryStore, PgStore,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("birdwatch=info".parse()?))
        .init();

    let config = load_from_env()?;
    let store: Arc<dyn EntityStore> = match config.database_url {
        Some(_) => Arc::new(PgStore::connect(&config).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };
    let state = AppState::new(store, config.search.clone());

    let app = Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", api_routes(state, config.body_limit_bytes));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
