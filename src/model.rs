//! Persisted records. A bird owns its sightings; a sighting refers back to its bird by id only.

use chrono::{DateTime, Utc};

pub type BirdId = i64;
pub type SightingId = i64;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Bird {
    pub id: BirdId,
    pub name: String,
    pub color: String,
    pub weight: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// `None` when the collection was not loaded with the record.
    #[sqlx(skip)]
    pub sightings: Option<Vec<Sighting>>,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Sighting {
    pub id: SightingId,
    pub bird_id: BirdId,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A bird not yet stored; the store assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBird {
    pub name: String,
    pub color: String,
    pub weight: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewSighting {
    pub bird_id: BirdId,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
