//! Record <-> DTO conversion.

use crate::dto::{BirdDto, BirdRequest, SightingDto, SightingRequest};
use crate::model::{Bird, NewBird, NewSighting, Sighting};
use chrono::{DateTime, Utc};

/// Sightings are expanded only when the collection was loaded; otherwise the list is empty.
pub fn bird_to_dto(bird: Bird) -> BirdDto {
    let sightings = bird
        .sightings
        .map(|s| s.into_iter().map(sighting_to_dto).collect())
        .unwrap_or_default();
    BirdDto {
        id: bird.id,
        name: bird.name,
        color: bird.color,
        weight: bird.weight,
        height: bird.height,
        sightings,
        created_at: bird.created_at,
        updated_at: bird.updated_at,
    }
}

pub fn sighting_to_dto(sighting: Sighting) -> SightingDto {
    SightingDto {
        id: sighting.id,
        bird_id: sighting.bird_id,
        location: sighting.location,
        date_time: sighting.date_time,
        created_at: sighting.created_at,
        updated_at: sighting.updated_at,
    }
}

pub fn bird_request_to_new(request: BirdRequest, now: DateTime<Utc>) -> NewBird {
    NewBird {
        name: request.name,
        color: request.color,
        weight: request.weight,
        height: request.height,
        created_at: now,
    }
}

pub fn sighting_request_to_new(request: SightingRequest, now: DateTime<Utc>) -> NewSighting {
    NewSighting {
        bird_id: request.bird_id,
        location: request.location,
        date_time: request.date_time,
        created_at: now,
    }
}
