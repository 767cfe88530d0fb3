//! Sighting service. A sighting is only created or moved onto a bird that exists.

use super::merge::merge_sighting;
use super::validation::RequestValidator;
use crate::config::SearchConfig;
use crate::dto::{SightingDto, SightingRequest, UpdateSightingRequest};
use crate::error::AppError;
use crate::mapper::{sighting_request_to_new, sighting_to_dto};
use crate::model::{BirdId, SightingId};
use crate::query::{select_sightings, PageParams, SightingFilter, SightingSortField};
use crate::response::PageResult;
use crate::store::EntityStore;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct SightingService {
    store: Arc<dyn EntityStore>,
    search: Arc<SearchConfig>,
}

impl SightingService {
    pub fn new(store: Arc<dyn EntityStore>, search: Arc<SearchConfig>) -> Self {
        SightingService { store, search }
    }

    pub async fn search(
        &self,
        filter: SightingFilter,
        params: PageParams,
    ) -> Result<PageResult<SightingDto>, AppError> {
        let request = params.resolve::<SightingSortField>(&self.search, &self.search.sightings)?;
        let selection = select_sightings(&filter);
        tracing::debug!(kind = ?selection.kind, predicates = selection.store.len(), "sighting query selected");
        // Every sighting filter is store-native; nothing is left for a post-store pass.
        let page = self.store.query_sightings(&selection.store, &request).await?;
        tracing::info!(
            kind = ?selection.kind,
            page = request.page,
            returned = page.content.len(),
            total = page.total_elements,
            "sighting search"
        );
        Ok(PageResult::from_page(page, sighting_to_dto))
    }

    pub async fn get(&self, id: SightingId) -> Result<SightingDto, AppError> {
        let sighting = self
            .store
            .fetch_sighting(id)
            .await?
            .ok_or_else(|| AppError::sighting_not_found(id))?;
        Ok(sighting_to_dto(sighting))
    }

    pub async fn create(&self, request: SightingRequest) -> Result<SightingDto, AppError> {
        RequestValidator::validate_sighting(&request)?;
        self.require_bird(request.bird_id).await?;
        let sighting = self
            .store
            .create_sighting(sighting_request_to_new(request, Utc::now()))
            .await?;
        tracing::info!(id = sighting.id, bird_id = sighting.bird_id, "sighting created");
        Ok(sighting_to_dto(sighting))
    }

    pub async fn update(&self, id: SightingId, request: UpdateSightingRequest) -> Result<SightingDto, AppError> {
        let mut sighting = self
            .store
            .fetch_sighting(id)
            .await?
            .ok_or_else(|| AppError::sighting_not_found(id))?;
        RequestValidator::validate_sighting_update(&request)?;
        if let Some(bird_id) = request.bird_id {
            self.require_bird(bird_id).await?;
        }
        if !merge_sighting(&mut sighting, request, Utc::now()) {
            return Ok(sighting_to_dto(sighting));
        }
        let sighting = self.store.update_sighting(&sighting).await?;
        tracing::info!(id, bird_id = sighting.bird_id, "sighting updated");
        Ok(sighting_to_dto(sighting))
    }

    pub async fn delete(&self, id: SightingId) -> Result<(), AppError> {
        if !self.store.delete_sighting(id).await? {
            tracing::warn!(id, "delete of unknown sighting");
            return Err(AppError::sighting_not_found(id));
        }
        tracing::info!(id, "sighting deleted");
        Ok(())
    }

    async fn require_bird(&self, bird_id: BirdId) -> Result<(), AppError> {
        if self.store.bird_exists(bird_id).await? {
            Ok(())
        } else {
            Err(AppError::bird_not_found(bird_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewBird;
    use crate::store::InMemoryStore;
    use chrono::{DateTime, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, day, 7, 30, 0).unwrap()
    }

    async fn service() -> (SightingService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        for name in ["American Robin", "Blue Jay"] {
            store
                .create_bird(NewBird {
                    name: name.into(),
                    color: "Red".into(),
                    weight: 50.0,
                    height: 20.0,
                    created_at: at(1),
                })
                .await
                .unwrap();
        }
        let service = SightingService::new(store.clone(), Arc::new(SearchConfig::default()));
        (service, store)
    }

    fn sighting(bird_id: BirdId, location: &str, day: u32) -> SightingRequest {
        SightingRequest {
            bird_id,
            location: location.into(),
            date_time: at(day),
        }
    }

    #[tokio::test]
    async fn missing_bird_creates_nothing() {
        let (service, store) = service().await;
        let err = service.create(sighting(42, "Central Park", 2)).await.unwrap_err();
        assert_eq!(err.to_string(), "not found: bird with id 42");
        assert!(!store.sighting_exists(1).await.unwrap());
    }

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let (service, _) = service().await;
        service.create(sighting(1, "Central Park", 2)).await.unwrap();
        service.create(sighting(2, "Prospect Park", 9)).await.unwrap();
        service.create(sighting(1, "Hudson River", 5)).await.unwrap();
        let result = service
            .search(SightingFilter::default(), PageParams::default())
            .await
            .unwrap();
        let days: Vec<_> = result.content.iter().map(|s| s.date_time).collect();
        assert_eq!(days, vec![at(9), at(5), at(2)]);
    }

    #[tokio::test]
    async fn combined_filters_all_apply() {
        let (service, _) = service().await;
        service.create(sighting(1, "Central Park", 2)).await.unwrap();
        service.create(sighting(1, "Central Park", 20)).await.unwrap();
        service.create(sighting(2, "Central Park", 3)).await.unwrap();
        let filter = SightingFilter {
            bird_name: Some("robin".into()),
            location: Some("central".into()),
            start: Some(at(1)),
            end: Some(at(10)),
        };
        let result = service.search(filter, PageParams::default()).await.unwrap();
        assert_eq!(result.total_elements, 1);
        assert_eq!(result.content[0].date_time, at(2));
    }

    #[tokio::test]
    async fn repointing_to_missing_bird_writes_nothing() {
        let (service, _) = service().await;
        let created = service.create(sighting(1, "Central Park", 2)).await.unwrap();
        let update = UpdateSightingRequest {
            bird_id: Some(77),
            location: Some("Elsewhere".into()),
            ..Default::default()
        };
        assert!(matches!(service.update(created.id, update).await, Err(AppError::NotFound(_))));
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_moves_sighting_and_stamps_time() {
        let (service, store) = service().await;
        let created = service.create(sighting(1, "Central Park", 2)).await.unwrap();
        let update = UpdateSightingRequest {
            bird_id: Some(2),
            ..Default::default()
        };
        let updated = service.update(created.id, update).await.unwrap();
        assert_eq!(updated.bird_id, 2);
        assert!(updated.updated_at.is_some());
        let jay = store.fetch_bird(2).await.unwrap().unwrap();
        assert_eq!(jay.sightings.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_sighting_wins_over_blank_location() {
        let (service, _) = service().await;
        let update = UpdateSightingRequest {
            location: Some("  ".into()),
            ..Default::default()
        };
        let err = service.update(5, update).await.unwrap_err();
        assert_eq!(err.to_string(), "not found: sighting with id 5");
    }
}
