//! Query selection: decides which predicates go to the store and which are applied
//! to the returned page, and names the store-native filter combination.

use crate::config::NumericFilterScope;
use crate::query::predicate::{BirdFilter, BirdPredicate, SightingFilter, SightingPredicate};

/// Store-native filter combination of a bird search. Numeric bounds do not take part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BirdQueryKind {
    All,
    Name,
    Color,
    NameAndColor,
}

/// Store-native filter combination of a sighting search. A date range with a single
/// bound is still a date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SightingQueryKind {
    All,
    BirdName,
    Location,
    DateRange,
    BirdNameAndLocation,
    BirdNameAndDateRange,
    LocationAndDateRange,
    BirdNameLocationAndDateRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selection<K, P> {
    pub kind: K,
    /// Conjunction evaluated by the store, before pagination.
    pub store: Vec<P>,
    /// Conjunction evaluated on the fetched page only.
    pub post: Vec<P>,
}

pub fn select_birds(
    filter: &BirdFilter,
    scope: NumericFilterScope,
) -> Selection<BirdQueryKind, BirdPredicate> {
    let (post, store): (Vec<_>, Vec<_>) = filter
        .predicates()
        .into_iter()
        .partition(|p| p.is_numeric() && scope == NumericFilterScope::WithinPage);

    let kind = match (filter.name.is_some(), filter.color.is_some()) {
        (true, true) => BirdQueryKind::NameAndColor,
        (true, false) => BirdQueryKind::Name,
        (false, true) => BirdQueryKind::Color,
        (false, false) => BirdQueryKind::All,
    };
    Selection { kind, store, post }
}

pub fn select_sightings(filter: &SightingFilter) -> Selection<SightingQueryKind, SightingPredicate> {
    let has_range = filter.start.is_some() || filter.end.is_some();
    let kind = match (filter.bird_name.is_some(), filter.location.is_some(), has_range) {
        (true, true, true) => SightingQueryKind::BirdNameLocationAndDateRange,
        (true, true, false) => SightingQueryKind::BirdNameAndLocation,
        (true, false, true) => SightingQueryKind::BirdNameAndDateRange,
        (false, true, true) => SightingQueryKind::LocationAndDateRange,
        (true, false, false) => SightingQueryKind::BirdName,
        (false, true, false) => SightingQueryKind::Location,
        (false, false, true) => SightingQueryKind::DateRange,
        (false, false, false) => SightingQueryKind::All,
    };
    Selection {
        kind,
        store: filter.predicates(),
        post: Vec::new(),
    }
}
