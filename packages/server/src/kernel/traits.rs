// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (the point workflow) lives in domains/points/actions and
// uses these traits.
//
// Naming convention: Base* for trait names (e.g., BasePointStore)

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::common::PointId;
use crate::domains::points::data::{NewPoint, PointFields};
use crate::domains::points::models::Point;
use crate::domains::points::PointError;

// =============================================================================
// Point Store Trait (Persistence)
// =============================================================================

#[async_trait]
pub trait BasePointStore: Send + Sync {
    /// Persist a new point with no external id
    async fn create(&self, point: NewPoint) -> Result<Point, PointError>;

    /// Fetch a point, `PointError::NotFound` if absent
    async fn get(&self, id: PointId) -> Result<Point, PointError>;

    /// Overwrite the editable fields of an existing point
    async fn update(&self, id: PointId, fields: &PointFields) -> Result<Point, PointError>;

    /// Remove a point permanently; deleting a missing point is `NotFound`
    async fn delete(&self, id: PointId) -> Result<(), PointError>;

    /// All points whose external id is set (`true`) or unset (`false`), by id
    async fn list_by_submission_status(&self, submitted: bool) -> Result<Vec<Point>, PointError>;

    /// Set the external id once; `InvalidState` if it is already set
    async fn mark_submitted(&self, id: PointId, external_id: &str) -> Result<Point, PointError>;

    async fn count(&self) -> Result<u64, PointError>;
}

// =============================================================================
// Map Submission Trait (External map service)
// =============================================================================

#[async_trait]
pub trait BaseMapSubmitter: Send + Sync {
    /// Upload a point on behalf of `admin` and return the service-assigned id
    async fn submit(&self, point: &Point, admin: &str) -> Result<String>;
}

// =============================================================================
// Identity Provider Trait (Federated login)
// =============================================================================

#[async_trait]
pub trait BaseIdentityProvider: Send + Sync {
    /// Start a login for the user-supplied identifier; returns the provider URL
    /// the browser should be redirected to
    async fn begin_login(&self, identifier: &str, return_to: &str) -> Result<String>;

    /// Verify the provider's response parameters and return the identity URL
    async fn complete_login(&self, params: &HashMap<String, String>) -> Result<String>;
}
