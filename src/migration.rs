//! Idempotent DDL for the bird and sighting tables.
//! Order follows PostgreSQL dependencies: schema, owning table, owned table, indexes.

use crate::error::AppError;
use crate::sql::quoted;
use sqlx::PgPool;

/// Statements that create the schema and its tables if they are missing.
/// The sightings foreign key cascades bird deletion to the owned rows.
pub fn schema_ddl(schema: &str) -> Vec<String> {
    let s = quoted(schema);
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", s),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."birds" (
    "id" BIGSERIAL PRIMARY KEY,
    "name" TEXT NOT NULL UNIQUE,
    "color" TEXT NOT NULL,
    "weight" DOUBLE PRECISION NOT NULL,
    "height" DOUBLE PRECISION NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    "updated_at" TIMESTAMPTZ
)"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."sightings" (
    "id" BIGSERIAL PRIMARY KEY,
    "bird_id" BIGINT NOT NULL REFERENCES {s}."birds" ("id") ON DELETE CASCADE,
    "location" TEXT NOT NULL,
    "date_time" TIMESTAMPTZ NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    "updated_at" TIMESTAMPTZ
)"#
        ),
        format!(r#"CREATE INDEX IF NOT EXISTS "sightings_bird_id_idx" ON {s}."sightings" ("bird_id")"#),
        format!(r#"CREATE INDEX IF NOT EXISTS "sightings_date_time_idx" ON {s}."sightings" ("date_time")"#),
    ]
}

pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    for ddl in schema_ddl(schema) {
        tracing::debug!(sql = %ddl, "migration");
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "schema ready");
    Ok(())
}
