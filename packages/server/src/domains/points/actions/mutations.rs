//! Point mutation actions - entry-point functions for the point workflow
//!
//! Called directly from the HTTP handlers. Actions are self-contained: they
//! take raw form input and the caller's identity, handle auth checks and
//! validation, and return final models.

use tracing::{info, warn};

use crate::common::auth::{Actor, AdminCapability};
use crate::common::PointId;
use crate::domains::points::data::{NewPoint, PointForm};
use crate::domains::points::models::Point;
use crate::domains::points::PointError;
use crate::kernel::ServerDeps;

/// Second-phase answer for a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    /// No answer yet: ask the admin to confirm
    Pending,
    Cancelled,
    Confirmed,
}

impl DeleteConfirmation {
    /// `"true"` confirms, `"false"` cancels, anything else asks again.
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("true") => Self::Confirmed,
            Some("false") => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// Nothing changed; the caller should show a confirmation prompt
    ConfirmationRequired(Point),
    /// Nothing changed; the admin backed out
    Cancelled(PointId),
    Deleted(Point),
}

/// Create a point from a user's form submission.
pub async fn create_point(
    form: &PointForm,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Point, PointError> {
    let submitter = actor.identity().ok_or(PointError::Unauthenticated)?;

    let fields = form
        .validate(&deps.amenities)
        .map_err(PointError::Validation)?;

    let point = deps
        .points
        .create(NewPoint {
            fields,
            submitter: submitter.to_string(),
        })
        .await?;

    info!(point_id = %point.id, submitter = %submitter, amenity = %point.amenity, "Point created");
    Ok(point)
}

/// Overwrite a point's fields (admin only).
///
/// A point already sent to OpenStreetMap keeps its coordinates and category;
/// only its name and URL may change.
pub async fn edit_point(
    id: PointId,
    form: &PointForm,
    actor: Actor,
    deps: &ServerDeps,
) -> Result<Point, PointError> {
    let admin = actor.can(AdminCapability::EditPoints).check(deps)?;

    let point = deps.points.get(id).await?;
    let fields = form
        .validate(&deps.amenities)
        .map_err(PointError::Validation)?;

    if point.is_sent() && fields.changes_location_or_category(&point) {
        return Err(PointError::InvalidState(format!(
            "point {} was already sent; its coordinates and category cannot change",
            id
        )));
    }

    let updated = deps.points.update(id, &fields).await?;

    info!(point_id = %id, admin = %admin, "Point edited");
    Ok(updated)
}

/// Two-phase delete (admin only).
pub async fn delete_point(
    id: PointId,
    confirmation: DeleteConfirmation,
    actor: Actor,
    deps: &ServerDeps,
) -> Result<DeleteOutcome, PointError> {
    let admin = actor.can(AdminCapability::DeletePoints).check(deps)?;

    let point = deps.points.get(id).await?;

    match confirmation {
        DeleteConfirmation::Pending => Ok(DeleteOutcome::ConfirmationRequired(point)),
        DeleteConfirmation::Cancelled => Ok(DeleteOutcome::Cancelled(id)),
        DeleteConfirmation::Confirmed => {
            deps.points.delete(id).await?;
            info!(point_id = %id, admin = %admin, "Point deleted");
            Ok(DeleteOutcome::Deleted(point))
        }
    }
}

/// Upload a point to OpenStreetMap and record its external id (admin only).
///
/// A failed upload leaves the point unsubmitted; there is no automatic retry.
/// Concurrent sends of the same point are refused while an upload is running.
pub async fn send_point(
    id: PointId,
    actor: Actor,
    deps: &ServerDeps,
) -> Result<Point, PointError> {
    let admin = actor.can(AdminCapability::SendPoints).check(deps)?;

    let point = deps.points.get(id).await?;
    if let Some(external_id) = &point.external_id {
        return Err(PointError::InvalidState(format!(
            "point {} was already submitted as {}",
            id, external_id
        )));
    }

    let Some(_claim) = deps.sends_in_flight.claim(id) else {
        return Err(PointError::InvalidState(format!(
            "point {} is already being submitted",
            id
        )));
    };

    let external_id = match deps.map_submitter.submit(&point, &admin).await {
        Ok(external_id) => external_id,
        Err(e) => {
            warn!(point_id = %id, admin = %admin, error = %e, "Point submission failed");
            return Err(PointError::Submission(format!("{:#}", e)));
        }
    };

    match deps.points.mark_submitted(id, &external_id).await {
        Ok(sent) => {
            info!(
                point_id = %id,
                admin = %admin,
                external_id = %external_id,
                "Point sent to OpenStreetMap"
            );
            Ok(sent)
        }
        Err(PointError::InvalidState(reason)) => {
            // Another server recorded a submission while this upload ran
            warn!(
                point_id = %id,
                admin = %admin,
                orphaned_external_id = %external_id,
                reason = %reason,
                "Point was submitted concurrently; uploaded node is orphaned"
            );
            Err(PointError::InvalidState(format!(
                "{}; node {} uploaded by this request is orphaned",
                reason, external_id
            )))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{MockMapSubmitter, TestDependencies};
    use std::sync::Arc;
    use std::time::Duration;

    const ADMIN: &str = "https://admin.example.org/";
    const USER: &str = "https://user1.example.org/";

    fn cafe_form() -> PointForm {
        PointForm {
            name: "Cafe X".to_string(),
            lat: "45.0".to_string(),
            lon: "7.0".to_string(),
            amenity: "cafe".to_string(),
            ..Default::default()
        }
    }

    async fn create_cafe(deps: &ServerDeps) -> Point {
        create_point(&cafe_form(), &Actor::new(USER), deps)
            .await
            .unwrap()
    }

    #[test]
    fn test_delete_confirmation_from_form() {
        assert_eq!(DeleteConfirmation::from_form(Some("true")), DeleteConfirmation::Confirmed);
        assert_eq!(DeleteConfirmation::from_form(Some("false")), DeleteConfirmation::Cancelled);
        assert_eq!(DeleteConfirmation::from_form(Some("maybe")), DeleteConfirmation::Pending);
        assert_eq!(DeleteConfirmation::from_form(None), DeleteConfirmation::Pending);
    }

    #[tokio::test]
    async fn test_create_stores_unsent_point() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.to_deps();

        let point = create_cafe(&deps).await;

        assert_eq!(point.name, "Cafe X");
        assert_eq!(point.submitter, USER);
        assert_eq!(point.external_id, None);
        assert_eq!(point.latitude.to_string(), "45.0");
        assert_eq!(point.longitude.to_string(), "7.0");
    }

    #[tokio::test]
    async fn test_create_requires_login() {
        let deps = TestDependencies::new().to_deps();

        let result = create_point(&cafe_form(), &Actor::anonymous(), &deps).await;

        assert!(matches!(result, Err(PointError::Unauthenticated)));
        assert_eq!(deps.points.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_twice_is_invalid_state() {
        let test_deps = TestDependencies::new()
            .admin(ADMIN)
            .mock_submitter(MockMapSubmitter::new().with_external_id("osm:123"));
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        let sent = send_point(point.id, Actor::new(ADMIN), &deps).await.unwrap();
        assert_eq!(sent.external_id.as_deref(), Some("osm:123"));

        let again = send_point(point.id, Actor::new(ADMIN), &deps).await;
        assert!(matches!(again, Err(PointError::InvalidState(_))));

        assert_eq!(test_deps.map_submitter.calls().len(), 1);
        let stored = deps.points.get(point.id).await.unwrap();
        assert_eq!(stored.external_id.as_deref(), Some("osm:123"));
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_point_new() {
        let test_deps = TestDependencies::new()
            .admin(ADMIN)
            .mock_submitter(MockMapSubmitter::new().with_failure("502 Bad Gateway"));
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        let result = send_point(point.id, Actor::new(ADMIN), &deps).await;
        assert!(matches!(result, Err(PointError::Submission(msg)) if msg.contains("502")));

        let stored = deps.points.get(point.id).await.unwrap();
        assert!(!stored.is_sent());

        // Manual retry succeeds with the default mock response
        let sent = send_point(point.id, Actor::new(ADMIN), &deps).await.unwrap();
        assert_eq!(sent.external_id, Some(format!("osm:{}", point.id)));
    }

    #[tokio::test]
    async fn test_submission_uses_admin_identity() {
        let test_deps = TestDependencies::new().admin(ADMIN);
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        send_point(point.id, Actor::new(ADMIN), &deps).await.unwrap();

        let calls = test_deps.map_submitter.calls();
        assert_eq!(calls[0].admin, ADMIN);
        assert_eq!(calls[0].point_id, point.id);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden_everywhere() {
        let test_deps = TestDependencies::new().admin(ADMIN);
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        let mut form = cafe_form();
        form.name = "Renamed".to_string();

        for actor in [Actor::new(USER), Actor::anonymous()] {
            let edit = edit_point(point.id, &form, actor.clone(), &deps).await;
            assert!(matches!(edit, Err(PointError::Forbidden)));

            let delete =
                delete_point(point.id, DeleteConfirmation::Confirmed, actor.clone(), &deps).await;
            assert!(matches!(delete, Err(PointError::Forbidden)));

            let send = send_point(point.id, actor, &deps).await;
            assert!(matches!(send, Err(PointError::Forbidden)));
        }

        let stored = deps.points.get(point.id).await.unwrap();
        assert_eq!(stored, point);
        assert!(test_deps.map_submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_updates_fields() {
        let deps = TestDependencies::new().admin(ADMIN).to_deps();
        let point = create_cafe(&deps).await;

        let form = PointForm {
            name: "Cafe Y".to_string(),
            url: "https://cafe-y.example.org".to_string(),
            lat: "45.5".to_string(),
            lon: "7.25".to_string(),
            amenity: "none".to_string(),
            new_amenity: "coworking".to_string(),
        };
        let edited = edit_point(point.id, &form, Actor::new(ADMIN), &deps).await.unwrap();

        assert_eq!(edited.id, point.id);
        assert_eq!(edited.name, "Cafe Y");
        assert_eq!(edited.url.as_deref(), Some("https://cafe-y.example.org"));
        assert_eq!(edited.latitude.to_string(), "45.5");
        assert_eq!(edited.amenity, "coworking");
        assert_eq!(edited.submitter, USER);
    }

    #[tokio::test]
    async fn test_edit_with_invalid_form_changes_nothing() {
        let deps = TestDependencies::new().admin(ADMIN).to_deps();
        let point = create_cafe(&deps).await;

        let mut form = cafe_form();
        form.lat = "123".to_string();
        let result = edit_point(point.id, &form, Actor::new(ADMIN), &deps).await;

        assert!(matches!(result, Err(PointError::Validation(errors)) if !errors.ok_coords));
        assert_eq!(deps.points.get(point.id).await.unwrap(), point);
    }

    #[tokio::test]
    async fn test_edit_missing_point_not_found() {
        let deps = TestDependencies::new().admin(ADMIN).to_deps();

        let result = edit_point(PointId::new(99), &cafe_form(), Actor::new(ADMIN), &deps).await;
        assert!(matches!(result, Err(PointError::NotFound(id)) if id == PointId::new(99)));
    }

    #[tokio::test]
    async fn test_sent_point_location_is_frozen() {
        let deps = TestDependencies::new().admin(ADMIN).to_deps();
        let point = create_cafe(&deps).await;
        send_point(point.id, Actor::new(ADMIN), &deps).await.unwrap();

        let mut moved = cafe_form();
        moved.lat = "46.0".to_string();
        let result = edit_point(point.id, &moved, Actor::new(ADMIN), &deps).await;
        assert!(matches!(result, Err(PointError::InvalidState(_))));

        let mut renamed = cafe_form();
        renamed.name = "Cafe X (renamed)".to_string();
        let edited = edit_point(point.id, &renamed, Actor::new(ADMIN), &deps).await.unwrap();
        assert_eq!(edited.name, "Cafe X (renamed)");
        assert!(edited.is_sent());
    }

    #[tokio::test]
    async fn test_two_phase_delete() {
        let deps = TestDependencies::new().admin(ADMIN).to_deps();
        let point = create_cafe(&deps).await;

        let prompt = delete_point(point.id, DeleteConfirmation::Pending, Actor::new(ADMIN), &deps)
            .await
            .unwrap();
        assert!(matches!(prompt, DeleteOutcome::ConfirmationRequired(p) if p.id == point.id));
        assert_eq!(deps.points.count().await.unwrap(), 1);

        let cancelled =
            delete_point(point.id, DeleteConfirmation::Cancelled, Actor::new(ADMIN), &deps)
                .await
                .unwrap();
        assert!(matches!(cancelled, DeleteOutcome::Cancelled(id) if id == point.id));
        assert_eq!(deps.points.count().await.unwrap(), 1);

        let deleted =
            delete_point(point.id, DeleteConfirmation::Confirmed, Actor::new(ADMIN), &deps)
                .await
                .unwrap();
        assert!(matches!(deleted, DeleteOutcome::Deleted(_)));
        assert_eq!(deps.points.count().await.unwrap(), 0);

        let missing =
            delete_point(point.id, DeleteConfirmation::Confirmed, Actor::new(ADMIN), &deps).await;
        assert!(matches!(missing, Err(PointError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_sends_upload_once() {
        let test_deps = TestDependencies::new()
            .admin(ADMIN)
            .mock_submitter(MockMapSubmitter::new().with_delay(Duration::from_millis(50)));
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        let (first, second) = tokio::join!(
            send_point(point.id, Actor::new(ADMIN), &deps),
            send_point(point.id, Actor::new(ADMIN), &deps),
        );

        assert_eq!(first.unwrap().external_id, Some(format!("osm:{}", point.id)));
        assert!(matches!(
            second,
            Err(PointError::InvalidState(msg)) if msg.contains("being submitted")
        ));
        assert_eq!(test_deps.map_submitter.calls().len(), 1);
        assert!(!deps.sends_in_flight.is_claimed(point.id));
    }

    #[tokio::test]
    async fn test_submission_recorded_elsewhere_reports_orphaned_node() {
        let test_deps = TestDependencies::new().admin(ADMIN);
        let deps = test_deps.to_deps();
        let point = create_cafe(&deps).await;

        // Another server records its own upload while ours is running
        let submitter = MockMapSubmitter::new()
            .with_external_id("osm:555")
            .with_concurrent_submission(deps.points.clone(), "osm:444");
        let deps = ServerDeps {
            map_submitter: Arc::new(submitter),
            ..deps
        };

        let result = send_point(point.id, Actor::new(ADMIN), &deps).await;
        assert!(matches!(
            result,
            Err(PointError::InvalidState(msg)) if msg.contains("osm:555")
        ));

        let stored = deps.points.get(point.id).await.unwrap();
        assert_eq!(stored.external_id.as_deref(), Some("osm:444"));
        assert!(!deps.sends_in_flight.is_claimed(point.id));
    }
}
