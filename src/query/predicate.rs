//! Filter criteria and the predicates they fold into.
//!
//! Every present filter value becomes one predicate; a search is the conjunction of its
//! predicates. Absent values produce no predicate at all, so they never constrain.

use crate::model::{Bird, Sighting};
use chrono::{DateTime, Utc};

/// A predicate that can be evaluated against an in-memory record.
pub trait Matches<R: ?Sized> {
    fn matches(&self, record: &R) -> bool;
}

/// True when every predicate holds (and for an empty conjunction).
pub fn all_match<R: ?Sized, P: Matches<R>>(predicates: &[P], record: &R) -> bool {
    predicates.iter().all(|p| p.matches(record))
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BirdFilter {
    pub name: Option<String>,
    pub color: Option<String>,
    pub weight_min: Option<f64>,
    pub weight_max: Option<f64>,
    pub height_min: Option<f64>,
    pub height_max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BirdPredicate {
    NameContains(String),
    ColorContains(String),
    WeightAtLeast(f64),
    WeightAtMost(f64),
    HeightAtLeast(f64),
    HeightAtMost(f64),
}

impl BirdPredicate {
    /// Numeric bounds; the rest are string containment.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, BirdPredicate::NameContains(_) | BirdPredicate::ColorContains(_))
    }
}

impl Matches<Bird> for BirdPredicate {
    fn matches(&self, bird: &Bird) -> bool {
        match self {
            BirdPredicate::NameContains(s) => contains_ignore_case(&bird.name, s),
            BirdPredicate::ColorContains(s) => contains_ignore_case(&bird.color, s),
            BirdPredicate::WeightAtLeast(min) => bird.weight >= *min,
            BirdPredicate::WeightAtMost(max) => bird.weight <= *max,
            BirdPredicate::HeightAtLeast(min) => bird.height >= *min,
            BirdPredicate::HeightAtMost(max) => bird.height <= *max,
        }
    }
}

impl BirdFilter {
    pub fn predicates(&self) -> Vec<BirdPredicate> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(BirdPredicate::NameContains(name.clone()));
        }
        if let Some(color) = &self.color {
            out.push(BirdPredicate::ColorContains(color.clone()));
        }
        out.extend(self.weight_min.map(BirdPredicate::WeightAtLeast));
        out.extend(self.weight_max.map(BirdPredicate::WeightAtMost));
        out.extend(self.height_min.map(BirdPredicate::HeightAtLeast));
        out.extend(self.height_max.map(BirdPredicate::HeightAtMost));
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SightingFilter {
    pub bird_name: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SightingPredicate {
    BirdNameContains(String),
    LocationContains(String),
    /// Inclusive lower bound on the observation time.
    ObservedFrom(DateTime<Utc>),
    /// Exclusive upper bound on the observation time.
    ObservedBefore(DateTime<Utc>),
}

/// A sighting together with the name of its bird, resolved by lookup.
pub struct SightingWithBirdName<'a> {
    pub sighting: &'a Sighting,
    pub bird_name: &'a str,
}

impl Matches<SightingWithBirdName<'_>> for SightingPredicate {
    fn matches(&self, record: &SightingWithBirdName<'_>) -> bool {
        let s = record.sighting;
        match self {
            SightingPredicate::BirdNameContains(name) => contains_ignore_case(record.bird_name, name),
            SightingPredicate::LocationContains(loc) => contains_ignore_case(&s.location, loc),
            SightingPredicate::ObservedFrom(start) => s.date_time >= *start,
            SightingPredicate::ObservedBefore(end) => s.date_time < *end,
        }
    }
}

impl SightingFilter {
    pub fn predicates(&self) -> Vec<SightingPredicate> {
        let mut out = Vec::new();
        if let Some(name) = &self.bird_name {
            out.push(SightingPredicate::BirdNameContains(name.clone()));
        }
        if let Some(location) = &self.location {
            out.push(SightingPredicate::LocationContains(location.clone()));
        }
        out.extend(self.start.map(SightingPredicate::ObservedFrom));
        out.extend(self.end.map(SightingPredicate::ObservedBefore));
        out
    }
}
