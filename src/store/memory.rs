//! In-memory entity store. Tables are shaped by ownership: each bird holds its
//! sightings, and a side index maps a sighting id to its owner.

use super::EntityStore;
use crate::error::AppError;
use crate::model::{Bird, BirdId, NewBird, NewSighting, Sighting, SightingId};
use crate::query::{
    all_match, BirdPredicate, BirdSortField, Page, PageRequest, SightingPredicate, SightingSortField,
    SightingWithBirdName, SortDirection,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    next_bird_id: BirdId,
    next_sighting_id: SightingId,
    /// Every stored bird has `sightings: Some(..)`, ordered by sighting id.
    birds: BTreeMap<BirdId, Bird>,
    owners: HashMap<SightingId, BirdId>,
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<BirdId>) -> bool {
        self.birds
            .values()
            .any(|b| b.name == name && Some(b.id) != except)
    }

    fn sightings_of_mut(&mut self, bird_id: BirdId) -> Option<&mut Vec<Sighting>> {
        self.birds
            .get_mut(&bird_id)
            .map(|b| b.sightings.get_or_insert_with(Vec::new))
    }

    fn find_sighting(&self, id: SightingId) -> Option<&Sighting> {
        let owner = self.owners.get(&id)?;
        self.birds
            .get(owner)?
            .sightings
            .as_deref()?
            .iter()
            .find(|s| s.id == id)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".into()))
    }
}

fn unique_name_violation(name: &str) -> AppError {
    AppError::Store(format!("duplicate bird name: {}", name))
}

fn missing_owner(bird_id: BirdId) -> AppError {
    AppError::Store(format!("sighting refers to missing bird {}", bird_id))
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_birds(a: &Bird, b: &Bird, field: BirdSortField) -> Ordering {
    match field {
        BirdSortField::Id => a.id.cmp(&b.id),
        BirdSortField::Name => a.name.cmp(&b.name),
        BirdSortField::Color => a.color.cmp(&b.color),
        BirdSortField::Weight => a.weight.total_cmp(&b.weight),
        BirdSortField::Height => a.height.total_cmp(&b.height),
        BirdSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        BirdSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn compare_sightings(a: &Sighting, b: &Sighting, field: SightingSortField) -> Ordering {
    match field {
        SightingSortField::Id => a.id.cmp(&b.id),
        SightingSortField::BirdId => a.bird_id.cmp(&b.bird_id),
        SightingSortField::Location => a.location.cmp(&b.location),
        SightingSortField::DateTime => a.date_time.cmp(&b.date_time),
        SightingSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SightingSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

/// Slice one page out of an already sorted match list.
fn paginate<T, F>(matched: Vec<T>, request: &PageRequest<F>) -> Page<T> {
    let total = matched.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let content = matched
        .into_iter()
        .skip(offset)
        .take(request.size as usize)
        .collect();
    Page::new(content, request, total)
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn create_bird(&self, bird: NewBird) -> Result<Bird, AppError> {
        let mut tables = self.write()?;
        if tables.name_taken(&bird.name, None) {
            return Err(unique_name_violation(&bird.name));
        }
        tables.next_bird_id += 1;
        let stored = Bird {
            id: tables.next_bird_id,
            name: bird.name,
            color: bird.color,
            weight: bird.weight,
            height: bird.height,
            created_at: bird.created_at,
            updated_at: None,
            sightings: Some(Vec::new()),
        };
        tables.birds.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn fetch_bird(&self, id: BirdId) -> Result<Option<Bird>, AppError> {
        Ok(self.read()?.birds.get(&id).cloned())
    }

    async fn bird_exists(&self, id: BirdId) -> Result<bool, AppError> {
        Ok(self.read()?.birds.contains_key(&id))
    }

    async fn update_bird(&self, bird: &Bird) -> Result<Bird, AppError> {
        let mut tables = self.write()?;
        if tables.name_taken(&bird.name, Some(bird.id)) {
            return Err(unique_name_violation(&bird.name));
        }
        let stored = tables
            .birds
            .get_mut(&bird.id)
            .ok_or_else(|| AppError::bird_not_found(bird.id))?;
        stored.name = bird.name.clone();
        stored.color = bird.color.clone();
        stored.weight = bird.weight;
        stored.height = bird.height;
        stored.updated_at = bird.updated_at;
        Ok(stored.clone())
    }

    async fn delete_bird(&self, id: BirdId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let Some(removed) = tables.birds.remove(&id) else {
            return Ok(false);
        };
        for sighting in removed.sightings.unwrap_or_default() {
            tables.owners.remove(&sighting.id);
        }
        Ok(true)
    }

    async fn query_birds(
        &self,
        predicates: &[BirdPredicate],
        request: &PageRequest<BirdSortField>,
    ) -> Result<Page<Bird>, AppError> {
        let tables = self.read()?;
        let mut matched: Vec<Bird> = tables
            .birds
            .values()
            .filter(|b| all_match(predicates, *b))
            .cloned()
            .collect();
        let sort = request.sort;
        matched.sort_by(|a, b| {
            directed(compare_birds(a, b, sort.field), sort.direction).then(a.id.cmp(&b.id))
        });
        Ok(paginate(matched, request))
    }

    async fn create_sighting(&self, sighting: NewSighting) -> Result<Sighting, AppError> {
        let mut tables = self.write()?;
        if !tables.birds.contains_key(&sighting.bird_id) {
            return Err(missing_owner(sighting.bird_id));
        }
        tables.next_sighting_id += 1;
        let stored = Sighting {
            id: tables.next_sighting_id,
            bird_id: sighting.bird_id,
            location: sighting.location,
            date_time: sighting.date_time,
            created_at: sighting.created_at,
            updated_at: None,
        };
        tables.owners.insert(stored.id, stored.bird_id);
        if let Some(owned) = tables.sightings_of_mut(stored.bird_id) {
            owned.push(stored.clone());
        }
        Ok(stored)
    }

    async fn fetch_sighting(&self, id: SightingId) -> Result<Option<Sighting>, AppError> {
        Ok(self.read()?.find_sighting(id).cloned())
    }

    async fn sighting_exists(&self, id: SightingId) -> Result<bool, AppError> {
        Ok(self.read()?.owners.contains_key(&id))
    }

    async fn update_sighting(&self, sighting: &Sighting) -> Result<Sighting, AppError> {
        let mut tables = self.write()?;
        let previous_owner = *tables
            .owners
            .get(&sighting.id)
            .ok_or_else(|| AppError::sighting_not_found(sighting.id))?;
        if !tables.birds.contains_key(&sighting.bird_id) {
            return Err(missing_owner(sighting.bird_id));
        }
        if let Some(owned) = tables.sightings_of_mut(previous_owner) {
            owned.retain(|s| s.id != sighting.id);
        }
        if let Some(owned) = tables.sightings_of_mut(sighting.bird_id) {
            let at = owned.partition_point(|s| s.id < sighting.id);
            owned.insert(at, sighting.clone());
        }
        tables.owners.insert(sighting.id, sighting.bird_id);
        Ok(sighting.clone())
    }

    async fn delete_sighting(&self, id: SightingId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let Some(owner) = tables.owners.remove(&id) else {
            return Ok(false);
        };
        if let Some(owned) = tables.sightings_of_mut(owner) {
            owned.retain(|s| s.id != id);
        }
        Ok(true)
    }

    async fn query_sightings(
        &self,
        predicates: &[SightingPredicate],
        request: &PageRequest<SightingSortField>,
    ) -> Result<Page<Sighting>, AppError> {
        let tables = self.read()?;
        let mut matched: Vec<Sighting> = tables
            .birds
            .values()
            .flat_map(|bird| {
                bird.sightings
                    .iter()
                    .flatten()
                    .map(move |s| SightingWithBirdName { sighting: s, bird_name: &bird.name })
            })
            .filter(|record| all_match(predicates, record))
            .map(|record| record.sighting.clone())
            .collect();
        let sort = request.sort;
        matched.sort_by(|a, b| {
            directed(compare_sightings(a, b, sort.field), sort.direction).then(a.id.cmp(&b.id))
        });
        Ok(paginate(matched, request))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Sort;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()
    }

    fn new_bird(name: &str, color: &str, weight: f64, height: f64) -> NewBird {
        NewBird {
            name: name.into(),
            color: color.into(),
            weight,
            height,
            created_at: at(1),
        }
    }

    fn new_sighting(bird_id: BirdId, location: &str, day: u32) -> NewSighting {
        NewSighting {
            bird_id,
            location: location.into(),
            date_time: at(day),
            created_at: at(1),
        }
    }

    fn request<F>(field: F, direction: SortDirection, page: u32, size: u32) -> PageRequest<F> {
        PageRequest {
            page,
            size,
            sort: Sort { field, direction },
        }
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create_bird(new_bird("Robin", "Red", 77.5, 25.0)).await.unwrap();
        store.create_bird(new_bird("Cardinal", "Red", 45.0, 22.0)).await.unwrap();
        store.create_bird(new_bird("Blue Jay", "Blue", 85.0, 30.0)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn assigns_ids_and_loads_empty_sightings() {
        let store = seeded().await;
        let robin = store.fetch_bird(1).await.unwrap().unwrap();
        assert_eq!(robin.name, "Robin");
        assert_eq!(robin.sightings, Some(vec![]));
        assert!(store.bird_exists(3).await.unwrap());
        assert!(!store.bird_exists(4).await.unwrap());
    }

    #[tokio::test]
    async fn bird_names_are_unique() {
        let store = seeded().await;
        let err = store
            .create_bird(new_bird("Robin", "Brown", 1.0, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));

        let mut jay = store.fetch_bird(3).await.unwrap().unwrap();
        jay.name = "Cardinal".into();
        assert!(matches!(store.update_bird(&jay).await, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn query_filters_sorts_and_paginates() {
        let store = seeded().await;
        let preds = [BirdPredicate::ColorContains("red".into())];
        let page = store
            .query_birds(&preds, &request(BirdSortField::Name, SortDirection::Asc, 0, 1))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].name, "Cardinal");

        let page = store
            .query_birds(&[], &request(BirdSortField::Weight, SortDirection::Desc, 0, 10))
            .await
            .unwrap();
        let names: Vec<_> = page.content.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Blue Jay", "Robin", "Cardinal"]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_keeps_total() {
        let store = seeded().await;
        let page = store
            .query_birds(&[], &request(BirdSortField::Id, SortDirection::Asc, 5, 2))
            .await
            .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn deleting_a_bird_removes_its_sightings() {
        let store = seeded().await;
        let s = store.create_sighting(new_sighting(1, "Central Park", 2)).await.unwrap();
        assert_eq!(store.fetch_bird(1).await.unwrap().unwrap().sightings.unwrap().len(), 1);

        assert!(store.delete_bird(1).await.unwrap());
        assert!(store.fetch_sighting(s.id).await.unwrap().is_none());
        assert!(!store.sighting_exists(s.id).await.unwrap());
        assert!(!store.delete_bird(1).await.unwrap());
    }

    #[tokio::test]
    async fn sighting_for_missing_bird_is_rejected() {
        let store = seeded().await;
        let err = store.create_sighting(new_sighting(42, "Nowhere", 2)).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn moving_a_sighting_changes_its_owner() {
        let store = seeded().await;
        let mut s = store.create_sighting(new_sighting(1, "Central Park", 2)).await.unwrap();
        s.bird_id = 2;
        store.update_sighting(&s).await.unwrap();

        assert!(store.fetch_bird(1).await.unwrap().unwrap().sightings.unwrap().is_empty());
        let owned = store.fetch_bird(2).await.unwrap().unwrap().sightings.unwrap();
        assert_eq!(owned, vec![s.clone()]);
        assert_eq!(store.fetch_sighting(s.id).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn sightings_filter_on_bird_name_and_range() {
        let store = seeded().await;
        store.create_sighting(new_sighting(1, "Central Park", 2)).await.unwrap();
        store.create_sighting(new_sighting(1, "Prospect Park", 5)).await.unwrap();
        store.create_sighting(new_sighting(3, "Central Park", 3)).await.unwrap();

        let preds = [
            SightingPredicate::BirdNameContains("rob".into()),
            SightingPredicate::ObservedFrom(at(2)),
            SightingPredicate::ObservedBefore(at(5)),
        ];
        let page = store
            .query_sightings(&preds, &request(SightingSortField::DateTime, SortDirection::Desc, 0, 10))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].location, "Central Park");
        assert_eq!(page.content[0].bird_id, 1);
    }

    #[tokio::test]
    async fn sightings_sort_newest_first() {
        let store = seeded().await;
        store.create_sighting(new_sighting(1, "A", 2)).await.unwrap();
        store.create_sighting(new_sighting(2, "B", 7)).await.unwrap();
        store.create_sighting(new_sighting(3, "C", 4)).await.unwrap();
        let page = store
            .query_sightings(&[], &request(SightingSortField::DateTime, SortDirection::Desc, 0, 10))
            .await
            .unwrap();
        let locations: Vec<_> = page.content.iter().map(|s| s.location.as_str()).collect();
        assert_eq!(locations, ["B", "C", "A"]);
    }
}
