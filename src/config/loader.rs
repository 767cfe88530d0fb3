//! Load `AppConfig` from environment variables, with an optional JSON file for search defaults.

use crate::config::{validate, AppConfig, SearchConfig};
use crate::error::ConfigError;
use std::path::Path;
use std::str::FromStr;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SCHEMA: &str = "BIRDWATCH_SCHEMA";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_BODY_LIMIT: &str = "BODY_LIMIT_BYTES";
pub const ENV_SEARCH_CONFIG_PATH: &str = "SEARCH_CONFIG_PATH";

/// Load from the process environment (call `dotenvy::dotenv()` first to pick up `.env`).
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using an arbitrary variable lookup. Empty values count as unset.
pub fn load_with<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let defaults = AppConfig::default();

    let search = match get(ENV_SEARCH_CONFIG_PATH) {
        Some(path) => load_search_config(Path::new(&path))?,
        None => SearchConfig::default(),
    };

    let config = AppConfig {
        database_url: get(ENV_DATABASE_URL),
        schema: get(ENV_SCHEMA).unwrap_or(defaults.schema),
        bind_addr: get(ENV_BIND_ADDR).unwrap_or(defaults.bind_addr),
        max_connections: parse_or(ENV_MAX_CONNECTIONS, get(ENV_MAX_CONNECTIONS), defaults.max_connections)?,
        body_limit_bytes: parse_or(ENV_BODY_LIMIT, get(ENV_BODY_LIMIT), defaults.body_limit_bytes)?,
        search,
    };
    validate(&config)?;
    Ok(config)
}

/// Read a `SearchConfig` JSON file. Missing keys take their defaults.
pub fn load_search_config(path: &Path) -> Result<SearchConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_search_config(&raw)
}

pub fn parse_search_config(raw: &str) -> Result<SearchConfig, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Load(format!("search config: {}", e)))
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::Load(format!("{} has an invalid value: {}", key, v))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NumericFilterScope;
    use crate::query::SortDirection;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load_with(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_overrides_from_environment() {
        let config = load_with(lookup(&[
            (ENV_DATABASE_URL, "postgres://localhost/birdwatch"),
            (ENV_SCHEMA, "aviary"),
            (ENV_MAX_CONNECTIONS, "12"),
            (ENV_BIND_ADDR, "  "),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/birdwatch"));
        assert_eq!(config.schema, "aviary");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn rejects_unparsable_numbers() {
        let err = load_with(lookup(&[(ENV_BODY_LIMIT, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BODY_LIMIT));
    }

    #[test]
    fn partial_search_config_keeps_other_defaults() {
        let search = parse_search_config(
            r#"{"default_page_size": 50, "numeric_filter_scope": "before_pagination",
                "sightings": {"field": "location", "direction": "asc"}}"#,
        )
        .unwrap();
        assert_eq!(search.default_page_size, 50);
        assert_eq!(search.max_page_size, 1000);
        assert_eq!(search.numeric_filter_scope, NumericFilterScope::BeforePagination);
        assert_eq!(search.sightings.field, "location");
        assert_eq!(search.sightings.direction, SortDirection::Asc);
        assert_eq!(search.birds.field, "name");
    }

    #[test]
    fn missing_search_config_file_is_a_load_error() {
        let err = load_search_config(Path::new("/nonexistent/search.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
