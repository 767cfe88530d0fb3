//! Sighting handlers: search, get, create, update, delete.

use super::non_blank;
use crate::dto::{SightingDto, SightingRequest, UpdateSightingRequest};
use crate::error::AppError;
use crate::query::{PageParams, SightingFilter};
use crate::response::{created, PageResult};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query string of `GET /sightings`. Timestamps are RFC 3339.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SightingSearchParams {
    /// Case-insensitive substring of the observed bird's name.
    pub bird_name: Option<String>,
    pub location: Option<String>,
    /// Inclusive start of the observation range.
    pub start_date_time: Option<DateTime<Utc>>,
    /// Exclusive end of the observation range.
    pub end_date_time: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl SightingSearchParams {
    pub fn split(self) -> (SightingFilter, PageParams) {
        let filter = SightingFilter {
            bird_name: non_blank(self.bird_name),
            location: non_blank(self.location),
            start: self.start_date_time,
            end: self.end_date_time,
        };
        let paging = PageParams {
            page: self.page,
            size: self.size,
            sort: non_blank(self.sort),
            direction: non_blank(self.direction),
        };
        (filter, paging)
    }
}

#[utoipa::path(
    get,
    path = "/sightings",
    tag = "sightings",
    params(SightingSearchParams),
    responses(
        (status = 200, description = "One page of sightings", body = PageResult<SightingDto>),
        (status = 400, description = "Unknown sort field or page size 0")
    )
)]
pub async fn search_sightings(
    State(state): State<AppState>,
    params: Result<Query<SightingSearchParams>, QueryRejection>,
) -> Result<Json<PageResult<SightingDto>>, AppError> {
    let Query(params) = params?;
    let (filter, paging) = params.split();
    Ok(Json(state.sightings.search(filter, paging).await?))
}

#[utoipa::path(
    get,
    path = "/sightings/{id}",
    tag = "sightings",
    params(("id" = i64, Path, description = "Sighting id")),
    responses(
        (status = 200, description = "The sighting", body = SightingDto),
        (status = 404, description = "No sighting with this id")
    )
)]
pub async fn get_sighting(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SightingDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.sightings.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/sightings",
    tag = "sightings",
    request_body = SightingRequest,
    responses(
        (status = 201, description = "Sighting created", body = SightingDto),
        (status = 404, description = "The referenced bird does not exist"),
        (status = 422, description = "Invalid sighting")
    )
)]
pub async fn create_sighting(
    State(state): State<AppState>,
    body: Result<Json<SightingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    Ok(created(state.sightings.create(body).await?))
}

#[utoipa::path(
    patch,
    path = "/sightings/{id}",
    tag = "sightings",
    params(("id" = i64, Path, description = "Sighting id")),
    request_body = UpdateSightingRequest,
    responses(
        (status = 200, description = "Sighting updated", body = SightingDto),
        (status = 404, description = "No such sighting, or the new bird does not exist")
    )
)]
pub async fn update_sighting(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateSightingRequest>, JsonRejection>,
) -> Result<Json<SightingDto>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    Ok(Json(state.sightings.update(id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/sightings/{id}",
    tag = "sightings",
    params(("id" = i64, Path, description = "Sighting id")),
    responses(
        (status = 204, description = "Sighting deleted"),
        (status = 404, description = "No sighting with this id")
    )
)]
pub async fn delete_sighting(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.sightings.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
