//! Entity store: the persistence capability behind the services.
//!
//! Two implementations share one trait: `PgStore` over a PostgreSQL pool, and
//! `InMemoryStore` used when no database is configured and by the test suite.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::{Bird, BirdId, NewBird, NewSighting, Sighting, SightingId};
use crate::query::{BirdPredicate, BirdSortField, Page, PageRequest, SightingPredicate, SightingSortField};
use async_trait::async_trait;

/// Per-entity persistence operations. Each call is atomic on its own; deleting a bird
/// removes its sightings inside the store.
///
/// Predicate slices are conjunctions: a record is returned only if every predicate holds.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_bird(&self, bird: NewBird) -> Result<Bird, AppError>;
    /// Fetch with the owned sightings loaded.
    async fn fetch_bird(&self, id: BirdId) -> Result<Option<Bird>, AppError>;
    async fn bird_exists(&self, id: BirdId) -> Result<bool, AppError>;
    /// Persist every scalar field of an existing bird. Sightings are not touched.
    async fn update_bird(&self, bird: &Bird) -> Result<Bird, AppError>;
    async fn delete_bird(&self, id: BirdId) -> Result<bool, AppError>;
    /// One page of birds, each with its sightings loaded.
    async fn query_birds(
        &self,
        predicates: &[BirdPredicate],
        request: &PageRequest<BirdSortField>,
    ) -> Result<Page<Bird>, AppError>;

    async fn create_sighting(&self, sighting: NewSighting) -> Result<Sighting, AppError>;
    async fn fetch_sighting(&self, id: SightingId) -> Result<Option<Sighting>, AppError>;
    async fn sighting_exists(&self, id: SightingId) -> Result<bool, AppError>;
    async fn update_sighting(&self, sighting: &Sighting) -> Result<Sighting, AppError>;
    async fn delete_sighting(&self, id: SightingId) -> Result<bool, AppError>;
    async fn query_sightings(
        &self,
        predicates: &[SightingPredicate],
        request: &PageRequest<SightingSortField>,
    ) -> Result<Page<Sighting>, AppError>;

    /// Cheap liveness check used by the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}
