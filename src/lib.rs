//! Birdwatch: a REST backend for birds and their sightings, with filtered, paginated search.

pub mod case;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod migration;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{load_from_env, AppConfig, NumericFilterScope, SearchConfig, SortDefaults};
pub use error::{AppError, ConfigError};
pub use migration::ensure_schema;
pub use response::PageResult;
pub use routes::{api_routes, common_routes, common_routes_with_ready};
pub use service::{BirdService, SightingService};
pub use state::AppState;
pub use store::{ensure_database_exists, EntityStore, InMemoryStore, PgStore};
