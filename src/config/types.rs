//! Runtime configuration types. `SearchConfig` may be loaded from JSON.

use crate::query::SortDirection;
use serde::{Deserialize, Serialize};

/// Where numeric bounds (weight/height) are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFilterScope {
    /// Applied to the fetched page only; the reported total is the filtered page length.
    #[default]
    WithinPage,
    /// Pushed into the store query; totals are global.
    BeforePagination,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortDefaults {
    pub field: String,
    pub direction: SortDirection,
}

/// Paging and sorting defaults passed explicitly into the search services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub birds: SortDefaults,
    pub sightings: SortDefaults,
    pub numeric_filter_scope: NumericFilterScope,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_page_size: 20,
            max_page_size: 1000,
            birds: SortDefaults {
                field: "name".into(),
                direction: SortDirection::Asc,
            },
            sightings: SortDefaults {
                field: "dateTime".into(),
                direction: SortDirection::Desc,
            },
            numeric_filter_scope: NumericFilterScope::WithinPage,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// PostgreSQL schema holding the birds and sightings tables.
    pub schema: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            schema: "birds".into(),
            bind_addr: "0.0.0.0:3000".into(),
            max_connections: 5,
            body_limit_bytes: 64 * 1024,
            search: SearchConfig::default(),
        }
    }
}
