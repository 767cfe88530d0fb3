//! Entity services: search, get, create, update and delete over an `EntityStore`.

mod birds;
pub mod merge;
pub mod post_filter;
mod sightings;
mod validation;

pub use birds::BirdService;
pub use sightings::SightingService;
pub use validation::RequestValidator;
