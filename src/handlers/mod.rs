//! HTTP handlers for birds and sightings, and the OpenAPI document.

pub mod birds;
pub mod openapi;
pub mod sightings;

pub use birds::*;
pub use openapi::ApiDoc;
pub use sightings::*;

/// Query-string text filters: blank counts as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
