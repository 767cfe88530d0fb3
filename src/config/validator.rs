//! Config validation: paging bounds, default sort fields, schema identifier.

use crate::config::{AppConfig, SearchConfig};
use crate::error::ConfigError;
use crate::query::{BirdSortField, SightingSortField, SortField};

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if !is_identifier(&config.schema) {
        return Err(ConfigError::Validation(format!(
            "schema must be a plain identifier: {}",
            config.schema
        )));
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Validation("max_connections must be greater than 0".into()));
    }
    validate_search(&config.search)
}

pub fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.default_page_size == 0 {
        return Err(ConfigError::Validation("default_page_size must be greater than 0".into()));
    }
    if search.max_page_size < search.default_page_size {
        return Err(ConfigError::Validation(format!(
            "max_page_size ({}) is below default_page_size ({})",
            search.max_page_size, search.default_page_size
        )));
    }
    BirdSortField::parse(&search.birds.field)
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    SightingSortField::parse(&search.sightings.field)
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    Ok(())
}

/// Letters, digits and underscores, not starting with a digit.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
