//! PostgreSQL implementation of the point store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::BasePointStore;
use crate::common::PointId;
use crate::domains::points::data::{NewPoint, PointFields};
use crate::domains::points::models::Point;
use crate::domains::points::PointError;

#[derive(Clone)]
pub struct PostgresPointStore {
    pool: PgPool,
}

impl PostgresPointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BasePointStore for PostgresPointStore {
    async fn create(&self, point: NewPoint) -> Result<Point, PointError> {
        Ok(Point::create(&point, &self.pool).await?)
    }

    async fn get(&self, id: PointId) -> Result<Point, PointError> {
        Point::find_by_id(id, &self.pool)
            .await?
            .ok_or(PointError::NotFound(id))
    }

    async fn update(&self, id: PointId, fields: &PointFields) -> Result<Point, PointError> {
        Point::update(id, fields, &self.pool)
            .await?
            .ok_or(PointError::NotFound(id))
    }

    async fn delete(&self, id: PointId) -> Result<(), PointError> {
        if Point::delete(id, &self.pool).await? {
            Ok(())
        } else {
            Err(PointError::NotFound(id))
        }
    }

    async fn list_by_submission_status(&self, submitted: bool) -> Result<Vec<Point>, PointError> {
        Ok(Point::find_by_submission_status(submitted, &self.pool).await?)
    }

    async fn mark_submitted(&self, id: PointId, external_id: &str) -> Result<Point, PointError> {
        if let Some(point) = Point::set_external_id(id, external_id, &self.pool).await? {
            return Ok(point);
        }

        // Nothing updated: tell "missing" apart from "already sent".
        let existing = self.get(id).await?;
        Err(PointError::InvalidState(format!(
            "point {} was already submitted as {}",
            id,
            existing.external_id.unwrap_or_default()
        )))
    }

    async fn count(&self) -> Result<u64, PointError> {
        let count = Point::count(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
