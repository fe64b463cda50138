use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::PointId;
use crate::domains::points::data::{NewPoint, PointFields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Point {
    pub id: PointId,
    pub name: String,
    pub url: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub amenity: String,
    pub submitter: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Point {
    /// Whether the point has been uploaded to OpenStreetMap.
    pub fn is_sent(&self) -> bool {
        self.external_id.is_some()
    }
}

// =============================================================================
// Point Queries
// =============================================================================

impl Point {
    pub async fn create(point: &NewPoint, pool: &PgPool) -> Result<Self> {
        let fields = &point.fields;
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO points (name, url, latitude, longitude, amenity, submitter)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(fields.name())
        .bind(fields.url())
        .bind(fields.coordinates().latitude())
        .bind(fields.coordinates().longitude())
        .bind(fields.amenity())
        .bind(&point.submitter)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: PointId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM points WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Overwrite the editable fields. Returns `None` if the row is gone.
    pub async fn update(id: PointId, fields: &PointFields, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE points
            SET name = $2, url = $3, latitude = $4, longitude = $5, amenity = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name())
        .bind(fields.url())
        .bind(fields.coordinates().latitude())
        .bind(fields.coordinates().longitude())
        .bind(fields.amenity())
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Returns `false` if there was nothing to delete.
    pub async fn delete(id: PointId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM points WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_submission_status(submitted: bool, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM points WHERE (external_id IS NOT NULL) = $1 ORDER BY id",
        )
        .bind(submitted)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Record the OpenStreetMap id, only if none is set yet.
    ///
    /// Returns `None` when the point is missing or already submitted.
    pub async fn set_external_id(
        id: PointId,
        external_id: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE points
            SET external_id = $2, updated_at = NOW()
            WHERE id = $1 AND external_id IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(external_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM points")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
