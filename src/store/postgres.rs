//! PostgreSQL entity store. All statements come from `sql::builder`; values are always bound.

use super::EntityStore;
use crate::config::AppConfig;
use crate::error::{AppError, ConfigError};
use crate::migration::ensure_schema;
use crate::model::{Bird, BirdId, NewBird, NewSighting, Sighting, SightingId};
use crate::query::{
    BirdPredicate, BirdSortField, Page, PageRequest, SightingPredicate, SightingSortField, SortField,
};
use crate::sql::{
    delete_by_id, exists_by_id, insert, select_by_column_in, select_by_id, select_page, update_by_id,
    CompareOp, Condition, PagedQuery, PgBindValue, QueryBuf, Table,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    /// Wrap an existing pool. The schema must already hold the bird and sighting tables.
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Create the database if missing, open a pool and apply the schema DDL.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("DATABASE_URL is not set".into()))?;
        ensure_database_exists(url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        ensure_schema(&pool, &config.schema).await?;
        tracing::info!(schema = %config.schema, "connected to PostgreSQL");
        Ok(PgStore::new(pool, config.schema.clone()))
    }

    fn birds(&self) -> Table<'_> {
        Table::birds(&self.schema)
    }

    fn sightings(&self) -> Table<'_> {
        Table::sightings(&self.schema)
    }

    async fn fetch_all<T>(&self, q: &QueryBuf) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn fetch_optional<T>(&self, q: &QueryBuf) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_one<T>(&self, q: &QueryBuf) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.fetch_optional(q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn fetch_flag(&self, q: &QueryBuf) -> Result<bool, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "exists");
        let mut query = sqlx::query_scalar::<_, bool>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    async fn fetch_page<T, F>(&self, paged: &PagedQuery, request: &PageRequest<F>) -> Result<Page<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        F: Sync,
    {
        let content = self.fetch_all(&paged.select).await?;
        let total = self.fetch_count(&paged.count).await?;
        Ok(Page::new(content, request, total))
    }

    /// Load the sightings of every given bird with one query.
    async fn attach_sightings(&self, birds: &mut [Bird]) -> Result<(), AppError> {
        let ids: Vec<PgBindValue> = birds.iter().map(|b| PgBindValue::I64(b.id)).collect();
        let q = select_by_column_in(&self.sightings(), "bird_id", &ids);
        let rows: Vec<Sighting> = self.fetch_all(&q).await?;
        let mut by_owner: HashMap<BirdId, Vec<Sighting>> = HashMap::new();
        for s in rows {
            by_owner.entry(s.bird_id).or_default().push(s);
        }
        for bird in birds.iter_mut() {
            bird.sightings = Some(by_owner.remove(&bird.id).unwrap_or_default());
        }
        Ok(())
    }
}

fn bird_condition(predicate: &BirdPredicate) -> Condition<'static> {
    let compare = |column: &'static str, op: CompareOp, value: f64| Condition::Compare {
        column,
        op,
        value: value.into(),
    };
    match predicate {
        BirdPredicate::NameContains(s) => Condition::Contains {
            column: "name",
            value: s.clone(),
        },
        BirdPredicate::ColorContains(s) => Condition::Contains {
            column: "color",
            value: s.clone(),
        },
        BirdPredicate::WeightAtLeast(v) => compare("weight", CompareOp::Ge, *v),
        BirdPredicate::WeightAtMost(v) => compare("weight", CompareOp::Le, *v),
        BirdPredicate::HeightAtLeast(v) => compare("height", CompareOp::Ge, *v),
        BirdPredicate::HeightAtMost(v) => compare("height", CompareOp::Le, *v),
    }
}

fn sighting_condition<'a>(predicate: &SightingPredicate, birds: Table<'a>) -> Condition<'a> {
    match predicate {
        SightingPredicate::BirdNameContains(s) => Condition::RelatedContains {
            related: birds,
            related_key: "id",
            local_key: "bird_id",
            column: "name",
            value: s.clone(),
        },
        SightingPredicate::LocationContains(s) => Condition::Contains {
            column: "location",
            value: s.clone(),
        },
        SightingPredicate::ObservedFrom(t) => Condition::Compare {
            column: "date_time",
            op: CompareOp::Ge,
            value: (*t).into(),
        },
        SightingPredicate::ObservedBefore(t) => Condition::Compare {
            column: "date_time",
            op: CompareOp::Lt,
            value: (*t).into(),
        },
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_bird(&self, bird: NewBird) -> Result<Bird, AppError> {
        let q = insert(
            &self.birds(),
            vec![
                ("name", bird.name.into()),
                ("color", bird.color.into()),
                ("weight", bird.weight.into()),
                ("height", bird.height.into()),
                ("created_at", bird.created_at.into()),
            ],
        );
        let mut stored: Bird = self.fetch_one(&q).await?;
        stored.sightings = Some(Vec::new());
        Ok(stored)
    }

    async fn fetch_bird(&self, id: BirdId) -> Result<Option<Bird>, AppError> {
        let Some(bird) = self.fetch_optional::<Bird>(&select_by_id(&self.birds(), id)).await? else {
            return Ok(None);
        };
        let mut one = [bird];
        self.attach_sightings(&mut one).await?;
        let [bird] = one;
        Ok(Some(bird))
    }

    async fn bird_exists(&self, id: BirdId) -> Result<bool, AppError> {
        self.fetch_flag(&exists_by_id(&self.birds(), id)).await
    }

    async fn update_bird(&self, bird: &Bird) -> Result<Bird, AppError> {
        let q = update_by_id(
            &self.birds(),
            bird.id,
            vec![
                ("name", bird.name.as_str().into()),
                ("color", bird.color.as_str().into()),
                ("weight", bird.weight.into()),
                ("height", bird.height.into()),
                ("updated_at", bird.updated_at.into()),
            ],
        );
        let stored: Bird = self
            .fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::bird_not_found(bird.id))?;
        let mut one = [stored];
        self.attach_sightings(&mut one).await?;
        let [stored] = one;
        Ok(stored)
    }

    async fn delete_bird(&self, id: BirdId) -> Result<bool, AppError> {
        Ok(self.execute(&delete_by_id(&self.birds(), id)).await? > 0)
    }

    async fn query_birds(
        &self,
        predicates: &[BirdPredicate],
        request: &PageRequest<BirdSortField>,
    ) -> Result<Page<Bird>, AppError> {
        let conditions: Vec<Condition<'_>> = predicates.iter().map(bird_condition).collect();
        let paged = select_page(
            &self.birds(),
            &conditions,
            request.sort.field.column(),
            request.sort.direction,
            request.size,
            request.offset(),
        );
        let mut page: Page<Bird> = self.fetch_page(&paged, request).await?;
        self.attach_sightings(&mut page.content).await?;
        Ok(page)
    }

    async fn create_sighting(&self, sighting: NewSighting) -> Result<Sighting, AppError> {
        let q = insert(
            &self.sightings(),
            vec![
                ("bird_id", sighting.bird_id.into()),
                ("location", sighting.location.into()),
                ("date_time", sighting.date_time.into()),
                ("created_at", sighting.created_at.into()),
            ],
        );
        self.fetch_one(&q).await
    }

    async fn fetch_sighting(&self, id: SightingId) -> Result<Option<Sighting>, AppError> {
        self.fetch_optional(&select_by_id(&self.sightings(), id)).await
    }

    async fn sighting_exists(&self, id: SightingId) -> Result<bool, AppError> {
        self.fetch_flag(&exists_by_id(&self.sightings(), id)).await
    }

    async fn update_sighting(&self, sighting: &Sighting) -> Result<Sighting, AppError> {
        let q = update_by_id(
            &self.sightings(),
            sighting.id,
            vec![
                ("bird_id", sighting.bird_id.into()),
                ("location", sighting.location.as_str().into()),
                ("date_time", sighting.date_time.into()),
                ("updated_at", sighting.updated_at.into()),
            ],
        );
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::sighting_not_found(sighting.id))
    }

    async fn delete_sighting(&self, id: SightingId) -> Result<bool, AppError> {
        Ok(self.execute(&delete_by_id(&self.sightings(), id)).await? > 0)
    }

    async fn query_sightings(
        &self,
        predicates: &[SightingPredicate],
        request: &PageRequest<SightingSortField>,
    ) -> Result<Page<Sighting>, AppError> {
        let birds = self.birds();
        let conditions: Vec<Condition<'_>> = predicates
            .iter()
            .map(|p| sighting_condition(p, birds))
            .collect();
        let paged = select_page(
            &self.sightings(),
            &conditions,
            request.sort.field.column(),
            request.sort.direction,
            request.size,
            request.offset(),
        );
        self.fetch_page(&paged, request).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Validation(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into the admin URL (same server, `postgres` database) and the target database name.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ConfigError::Validation("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/birdwatch?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "birdwatch");
        assert!(parse_db_name_from_url("localhost").is_err());
    }

    #[test]
    fn numeric_bounds_become_inclusive_comparisons() {
        match bird_condition(&BirdPredicate::WeightAtMost(80.0)) {
            Condition::Compare { column, op, value } => {
                assert_eq!(column, "weight");
                assert_eq!(op, CompareOp::Le);
                assert_eq!(value, PgBindValue::F64(80.0));
            }
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn bird_name_filter_on_sightings_is_a_related_match() {
        let birds = Table::birds("birds");
        match sighting_condition(&SightingPredicate::BirdNameContains("jay".into()), birds) {
            Condition::RelatedContains { related, local_key, column, .. } => {
                assert_eq!(related.name, "birds");
                assert_eq!(local_key, "bird_id");
                assert_eq!(column, "name");
            }
            other => panic!("unexpected condition {:?}", other),
        }
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        match sighting_condition(&SightingPredicate::ObservedBefore(end), birds) {
            Condition::Compare { op, .. } => assert_eq!(op, CompareOp::Lt),
            other => panic!("unexpected condition {:?}", other),
        }
    }
}
