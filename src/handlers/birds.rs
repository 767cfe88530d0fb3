//! Bird handlers: search, get, create, update, delete.

use super::non_blank;
use crate::dto::{BirdDto, BirdRequest, UpdateBirdRequest};
use crate::error::AppError;
use crate::query::{BirdFilter, PageParams};
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
use serde::Deserialize;
use utoipa::IntoParams;

/// Query string of `GET /birds`. Every parameter is optional.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BirdSearchParams {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Case-insensitive substring of the color.
    pub color: Option<String>,
    pub weight_min: Option<f64>,
    pub weight_max: Option<f64>,
    pub height_min: Option<f64>,
    pub height_max: Option<f64>,
    /// Zero-based page index.
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Sort field, e.g. `name` or `createdAt`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub direction: Option<String>,
}

impl BirdSearchParams {
    pub fn split(self) -> (BirdFilter, PageParams) {
        let filter = BirdFilter {
            name: non_blank(self.name),
            color: non_blank(self.color),
            weight_min: self.weight_min,
            weight_max: self.weight_max,
            height_min: self.height_min,
            height_max: self.height_max,
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
    path = "/birds",
    tag = "birds",
    params(BirdSearchParams),
    responses(
        (status = 200, description = "One page of birds", body = PageResult<BirdDto>),
        (status = 400, description = "Unknown sort field or page size 0")
    )
)]
pub async fn search_birds(
    State(state): State<AppState>,
    params: Result<Query<BirdSearchParams>, QueryRejection>,
) -> Result<Json<PageResult<BirdDto>>, AppError> {
    let Query(params) = params?;
    let (filter, paging) = params.split();
    Ok(Json(state.birds.search(filter, paging).await?))
}

#[utoipa::path(
    get,
    path = "/birds/{id}",
    tag = "birds",
    params(("id" = i64, Path, description = "Bird id")),
    responses(
        (status = 200, description = "The bird with its sightings", body = BirdDto),
        (status = 404, description = "No bird with this id")
    )
)]
pub async fn get_bird(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BirdDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.birds.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/birds",
    tag = "birds",
    request_body = BirdRequest,
    responses(
        (status = 201, description = "Bird created", body = BirdDto),
        (status = 422, description = "Invalid bird")
    )
)]
pub async fn create_bird(
    State(state): State<AppState>,
    body: Result<Json<BirdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    Ok(created(state.birds.create(body).await?))
}

#[utoipa::path(
    patch,
    path = "/birds/{id}",
    tag = "birds",
    params(("id" = i64, Path, description = "Bird id")),
    request_body = UpdateBirdRequest,
    responses(
        (status = 200, description = "Bird updated", body = BirdDto),
        (status = 404, description = "No bird with this id"),
        (status = 422, description = "Invalid field value")
    )
)]
pub async fn update_bird(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateBirdRequest>, JsonRejection>,
) -> Result<Json<BirdDto>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    Ok(Json(state.birds.update(id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/birds/{id}",
    tag = "birds",
    params(("id" = i64, Path, description = "Bird id")),
    responses(
        (status = 204, description = "Bird and its sightings deleted"),
        (status = 404, description = "No bird with this id")
    )
)]
pub async fn delete_bird(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.birds.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
