//! Post-store filtering of an already fetched page.

use crate::query::{all_match, Matches, Page};

/// Keep only the records of this page satisfying every predicate. The reported total
/// becomes the filtered length, since records on other pages were never examined.
/// With no predicates the page is returned as is.
pub fn apply<R, P: Matches<R>>(page: Page<R>, predicates: &[P]) -> Page<R> {
    if predicates.is_empty() {
        return page;
    }
    let content: Vec<R> = page
        .content
        .into_iter()
        .filter(|r| all_match(predicates, r))
        .collect();
    Page {
        total_elements: content.len() as u64,
        content,
        page: page.page,
        size: page.size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bird;
    use crate::query::BirdPredicate;
    use chrono::Utc;

    fn bird(id: i64, weight: f64) -> Bird {
        Bird {
            id,
            name: format!("bird-{}", id),
            color: "Red".into(),
            weight,
            height: 20.0,
            created_at: Utc::now(),
            updated_at: None,
            sightings: None,
        }
    }

    fn page(weights: &[f64]) -> Page<Bird> {
        Page {
            content: weights.iter().enumerate().map(|(i, w)| bird(i as i64 + 1, *w)).collect(),
            page: 1,
            size: 3,
            total_elements: 9,
        }
    }

    #[test]
    fn no_bounds_leaves_page_untouched() {
        let untouched = page(&[10.0, 50.0]);
        let filtered = apply::<Bird, BirdPredicate>(untouched.clone(), &[]);
        assert_eq!(filtered, untouched);
    }

    #[test]
    fn bounds_are_inclusive_and_total_is_recounted() {
        let preds = [BirdPredicate::WeightAtLeast(40.0), BirdPredicate::WeightAtMost(80.0)];
        let filtered = apply(page(&[77.5, 45.0, 85.0]), &preds);
        let weights: Vec<f64> = filtered.content.iter().map(|b| b.weight).collect();
        assert_eq!(weights, vec![77.5, 45.0]);
        assert_eq!(filtered.total_elements, 2);
        assert_eq!(filtered.page, 1);
        assert_eq!(filtered.size, 3);

        let edge = apply(page(&[40.0, 80.0]), &preds);
        assert_eq!(edge.total_elements, 2);
    }
}
