//! Response envelopes: the paginated search result and status helpers.

use crate::query::Page;
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform paginated response shape shared by every search endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: u32,
}

impl<T> PageResult<T> {
    /// Project each record and fill the paging metadata from the page as given.
    /// Sorting and filtering are the producer's concern.
    pub fn from_page<R, F>(page: Page<R>, project: F) -> Self
    where
        F: FnMut(R) -> T,
    {
        let total_pages = total_pages(page.total_elements, page.size);
        let content: Vec<T> = page.content.into_iter().map(project).collect();
        PageResult {
            number_of_elements: content.len() as u32,
            content,
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages,
            first: page.page == 0,
            last: u64::from(page.page) + 1 >= u64::from(total_pages),
        }
    }
}

/// ceil(total / size); zero elements give zero pages.
pub fn total_pages(total_elements: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let pages = total_elements.div_ceil(u64::from(size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}
