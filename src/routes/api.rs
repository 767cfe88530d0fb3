//! Bird and sighting routes. Nested under `/api/v1` by the server.

use crate::handlers::{
    create_bird, create_sighting, delete_bird, delete_sighting, get_bird, get_sighting, search_birds,
    search_sightings, update_bird, update_sighting,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// PUT and PATCH both take a sparse body; only present fields change.
pub fn api_routes(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/birds", get(search_birds).post(create_bird))
        .route(
            "/birds/:id",
            get(get_bird).put(update_bird).patch(update_bird).delete(delete_bird),
        )
        .route("/sightings", get(search_sightings).post(create_sighting))
        .route(
            "/sightings/:id",
            get(get_sighting)
                .put(update_sighting)
                .patch(update_sighting)
                .delete(delete_sighting),
        )
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}
