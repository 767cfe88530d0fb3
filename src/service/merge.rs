//! Partial-update merge: apply every present field of a sparse request onto a record.

use crate::dto::{UpdateBirdRequest, UpdateSightingRequest};
use crate::model::{Bird, Sighting};
use chrono::{DateTime, Utc};

fn set_if_present<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Returns whether any field was applied; if so `updated_at` is set to `now`.
pub fn merge_bird(bird: &mut Bird, update: UpdateBirdRequest, now: DateTime<Utc>) -> bool {
    let mut applied = false;
    applied |= set_if_present(&mut bird.name, update.name);
    applied |= set_if_present(&mut bird.color, update.color);
    applied |= set_if_present(&mut bird.weight, update.weight);
    applied |= set_if_present(&mut bird.height, update.height);
    if applied {
        bird.updated_at = Some(now);
    }
    applied
}

pub fn merge_sighting(sighting: &mut Sighting, update: UpdateSightingRequest, now: DateTime<Utc>) -> bool {
    let mut applied = false;
    applied |= set_if_present(&mut sighting.bird_id, update.bird_id);
    applied |= set_if_present(&mut sighting.location, update.location);
    applied |= set_if_present(&mut sighting.date_time, update.date_time);
    if applied {
        sighting.updated_at = Some(now);
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
    }

    fn robin() -> Bird {
        Bird {
            id: 1,
            name: "American Robin".into(),
            color: "Red".into(),
            weight: 77.5,
            height: 25.0,
            created_at: at(8),
            updated_at: None,
            sightings: None,
        }
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut bird = robin();
        assert!(!merge_bird(&mut bird, UpdateBirdRequest::default(), at(9)));
        assert_eq!(bird, robin());
    }

    #[test]
    fn single_field_update_touches_only_that_field() {
        let mut bird = robin();
        let update = UpdateBirdRequest {
            color: Some("Orange".into()),
            ..Default::default()
        };
        assert!(merge_bird(&mut bird, update, at(9)));
        assert_eq!(bird.color, "Orange");
        assert_eq!(bird.name, "American Robin");
        assert_eq!(bird.weight, 77.5);
        assert_eq!(bird.created_at, at(8));
        assert_eq!(bird.updated_at, Some(at(9)));
    }

    #[test]
    fn sighting_can_be_repointed() {
        let mut sighting = Sighting {
            id: 4,
            bird_id: 1,
            location: "Central Park".into(),
            date_time: at(6),
            created_at: at(7),
            updated_at: None,
        };
        let update = UpdateSightingRequest {
            bird_id: Some(2),
            ..Default::default()
        };
        assert!(merge_sighting(&mut sighting, update, at(10)));
        assert_eq!(sighting.bird_id, 2);
        assert_eq!(sighting.location, "Central Park");
        assert_eq!(sighting.updated_at, Some(at(10)));
    }
}
