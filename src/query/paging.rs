//! Page requests, sort fields and raw store pages.

use crate::case::{to_camel_case, to_snake_case};
use crate::config::{SearchConfig, SortDefaults};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Descending only when explicitly "desc" (any case); everything else sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sortable field of one entity kind, identified by its column name.
pub trait SortField: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    const ALL: &'static [Self];
    const ENTITY: &'static str;

    fn column(self) -> &'static str;

    /// Accepts the camelCase API name ("dateTime") or the column name ("date_time").
    fn parse(name: &str) -> Result<Self, AppError> {
        let column = to_snake_case(name.trim());
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.column() == column)
            .ok_or_else(|| {
                let expected: Vec<String> = Self::ALL.iter().map(|f| to_camel_case(f.column())).collect();
                AppError::BadRequest(format!(
                    "unknown sort field for {}: {} (expected one of {})",
                    Self::ENTITY,
                    name,
                    expected.join(", ")
                ))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BirdSortField {
    Id,
    Name,
    Color,
    Weight,
    Height,
    CreatedAt,
    UpdatedAt,
}

impl SortField for BirdSortField {
    const ALL: &'static [Self] = &[
        BirdSortField::Id,
        BirdSortField::Name,
        BirdSortField::Color,
        BirdSortField::Weight,
        BirdSortField::Height,
        BirdSortField::CreatedAt,
        BirdSortField::UpdatedAt,
    ];
    const ENTITY: &'static str = "birds";

    fn column(self) -> &'static str {
        match self {
            BirdSortField::Id => "id",
            BirdSortField::Name => "name",
            BirdSortField::Color => "color",
            BirdSortField::Weight => "weight",
            BirdSortField::Height => "height",
            BirdSortField::CreatedAt => "created_at",
            BirdSortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SightingSortField {
    Id,
    BirdId,
    Location,
    DateTime,
    CreatedAt,
    UpdatedAt,
}

impl SortField for SightingSortField {
    const ALL: &'static [Self] = &[
        SightingSortField::Id,
        SightingSortField::BirdId,
        SightingSortField::Location,
        SightingSortField::DateTime,
        SightingSortField::CreatedAt,
        SightingSortField::UpdatedAt,
    ];
    const ENTITY: &'static str = "sightings";

    fn column(self) -> &'static str {
        match self {
            SightingSortField::Id => "id",
            SightingSortField::BirdId => "bird_id",
            SightingSortField::Location => "location",
            SightingSortField::DateTime => "date_time",
            SightingSortField::CreatedAt => "created_at",
            SightingSortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

/// Resolved paging input: zero-based page index, page size > 0, sort.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageRequest<F> {
    pub page: u32,
    pub size: u32,
    pub sort: Sort<F>,
}

impl<F> PageRequest<F> {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// Raw paging parameters as they arrive from the caller; every field may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl PageParams {
    /// Fills absent values from the search config and the entity's sort defaults.
    /// Size 0 is rejected; sizes above the configured maximum are clamped.
    pub fn resolve<F: SortField>(
        &self,
        config: &SearchConfig,
        defaults: &SortDefaults,
    ) -> Result<PageRequest<F>, AppError> {
        let size = self.size.unwrap_or(config.default_page_size);
        if size == 0 {
            return Err(AppError::BadRequest("page size must be greater than 0".into()));
        }
        let field = match self.sort.as_deref() {
            Some(name) => F::parse(name)?,
            None => F::parse(&defaults.field)?,
        };
        let direction = self
            .direction
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or(defaults.direction);
        Ok(PageRequest {
            page: self.page.unwrap_or(0),
            size: size.min(config.max_page_size),
            sort: Sort { field, direction },
        })
    }
}

/// One page of raw records as returned by a store.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    /// Total matching records across all pages, as reported by the producer of this page.
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new<F>(content: Vec<T>, request: &PageRequest<F>, total_elements: u64) -> Self {
        Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }
}
