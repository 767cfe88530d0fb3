//! OpenAPI document for the `/api/v1` surface.

use crate::dto::{BirdDto, BirdRequest, SightingDto, SightingRequest, UpdateBirdRequest, UpdateSightingRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "birdwatch", description = "Birds and their sightings"),
    servers((url = "/api/v1")),
    paths(
        super::birds::search_birds,
        super::birds::get_bird,
        super::birds::create_bird,
        super::birds::update_bird,
        super::birds::delete_bird,
        super::sightings::search_sightings,
        super::sightings::get_sighting,
        super::sightings::create_sighting,
        super::sightings::update_sighting,
        super::sightings::delete_sighting,
    ),
    components(schemas(BirdDto, SightingDto, BirdRequest, UpdateBirdRequest, SightingRequest, UpdateSightingRequest)),
    tags(
        (name = "birds", description = "Bird records"),
        (name = "sightings", description = "Observations of a bird")
    )
)]
pub struct ApiDoc;
