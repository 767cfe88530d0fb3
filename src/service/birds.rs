//! Bird service: search with the configured numeric filter scope, plus CRUD.

use super::merge::merge_bird;
use super::post_filter;
use super::validation::RequestValidator;
use crate::config::SearchConfig;
use crate::dto::{BirdDto, BirdRequest, UpdateBirdRequest};
use crate::error::AppError;
use crate::mapper::{bird_request_to_new, bird_to_dto};
use crate::model::BirdId;
use crate::query::{select_birds, BirdFilter, BirdSortField, PageParams};
use crate::response::PageResult;
use crate::store::EntityStore;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct BirdService {
    store: Arc<dyn EntityStore>,
    search: Arc<SearchConfig>,
}

impl BirdService {
    pub fn new(store: Arc<dyn EntityStore>, search: Arc<SearchConfig>) -> Self {
        BirdService { store, search }
    }

    pub async fn search(&self, filter: BirdFilter, params: PageParams) -> Result<PageResult<BirdDto>, AppError> {
        let request = params.resolve::<BirdSortField>(&self.search, &self.search.birds)?;
        let selection = select_birds(&filter, self.search.numeric_filter_scope);
        tracing::debug!(
            kind = ?selection.kind,
            store_predicates = selection.store.len(),
            post_predicates = selection.post.len(),
            "bird query selected"
        );
        let page = self.store.query_birds(&selection.store, &request).await?;
        let page = post_filter::apply(page, &selection.post);
        tracing::info!(
            kind = ?selection.kind,
            page = request.page,
            returned = page.content.len(),
            total = page.total_elements,
            "bird search"
        );
        Ok(PageResult::from_page(page, bird_to_dto))
    }

    pub async fn get(&self, id: BirdId) -> Result<BirdDto, AppError> {
        let bird = self
            .store
            .fetch_bird(id)
            .await?
            .ok_or_else(|| AppError::bird_not_found(id))?;
        Ok(bird_to_dto(bird))
    }

    pub async fn create(&self, request: BirdRequest) -> Result<BirdDto, AppError> {
        RequestValidator::validate_bird(&request)?;
        let bird = self
            .store
            .create_bird(bird_request_to_new(request, Utc::now()))
            .await?;
        tracing::info!(id = bird.id, name = %bird.name, "bird created");
        Ok(bird_to_dto(bird))
    }

    /// Apply the present fields. Nothing is written when no field is present.
    pub async fn update(&self, id: BirdId, request: UpdateBirdRequest) -> Result<BirdDto, AppError> {
        let mut bird = self
            .store
            .fetch_bird(id)
            .await?
            .ok_or_else(|| AppError::bird_not_found(id))?;
        RequestValidator::validate_bird_update(&request)?;
        if !merge_bird(&mut bird, request, Utc::now()) {
            return Ok(bird_to_dto(bird));
        }
        let bird = self.store.update_bird(&bird).await?;
        tracing::info!(id, "bird updated");
        Ok(bird_to_dto(bird))
    }

    /// Delete a bird together with its sightings.
    pub async fn delete(&self, id: BirdId) -> Result<(), AppError> {
        if !self.store.delete_bird(id).await? {
            tracing::warn!(id, "delete of unknown bird");
            return Err(AppError::bird_not_found(id));
        }
        tracing::info!(id, "bird deleted");
        Ok(())
    }
}
