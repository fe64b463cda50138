//! Point query actions - read-only entry points for the point workflow

use serde::Serialize;

use crate::common::auth::Actor;
use crate::common::PointId;
use crate::domains::points::models::Point;
use crate::domains::points::PointError;
use crate::kernel::ServerDeps;

/// The public point list, split by submission status.
#[derive(Debug, Clone, Serialize)]
pub struct PointListing {
    pub sent_points: Vec<Point>,
    pub local_points: Vec<Point>,
}

/// A single point as seen by the requesting user.
#[derive(Debug, Clone, Serialize)]
pub struct PointView {
    pub point: Point,
    /// Whether the edit/delete/send controls should be offered
    pub is_admin: bool,
}

/// List every point. Open to everyone.
pub async fn list_points(deps: &ServerDeps) -> Result<PointListing, PointError> {
    let sent_points = deps.points.list_by_submission_status(true).await?;
    let local_points = deps.points.list_by_submission_status(false).await?;

    Ok(PointListing {
        sent_points,
        local_points,
    })
}

pub async fn get_point(
    id: PointId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<PointView, PointError> {
    let point = deps.points.get(id).await?;

    Ok(PointView {
        point,
        is_admin: actor.is_admin(deps),
    })
}
