//! Point routes: listing, submission and admin actions.

use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::common::auth::Actor;
use crate::common::PointId;
use crate::domains::points::actions::{
    create_point, delete_point, edit_point, get_point, list_points, send_point,
    DeleteConfirmation, DeleteOutcome, PointListing, PointView,
};
use crate::domains::points::data::PointForm;
use crate::domains::points::{Amenity, Point, PointError};
use crate::server::app::AppState;
use crate::server::middleware::CurrentUser;

fn actor(user: Option<Extension<CurrentUser>>) -> Actor {
    Actor::from_session(user.map(|Extension(user)| user.identity))
}

fn point_page(id: PointId) -> Redirect {
    Redirect::to(&format!("/points/{}", id))
}

/// `GET /` and `GET /points`
pub async fn list_points_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<PointListing>, PointError> {
    Ok(Json(list_points(&state.deps).await?))
}

/// `GET /points/:id`
pub async fn show_point_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<PointId>,
) -> Result<Json<PointView>, PointError> {
    Ok(Json(get_point(id, &actor(user), &state.deps).await?))
}

/// `GET /amenities`
pub async fn amenities_handler(Extension(state): Extension<AppState>) -> Json<Vec<Amenity>> {
    Json(state.deps.amenities.choices().to_vec())
}

/// `POST /save_poi`
pub async fn save_poi(
    Extension(state): Extension<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<PointForm>,
) -> Result<Redirect, PointError> {
    create_point(&form, &actor(user), &state.deps).await?;
    Ok(Redirect::to("/thank_you"))
}

/// `POST /points/:id/edit`
pub async fn edit_point_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<PointId>,
    Form(form): Form<PointForm>,
) -> Result<Redirect, PointError> {
    edit_point(id, &form, actor(user), &state.deps).await?;
    Ok(point_page(id))
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    confirm: Option<String>,
}

#[derive(Serialize)]
struct ConfirmDelete {
    confirm_required: bool,
    point: Point,
}

/// `POST /points/:id/delete`
///
/// Without a `confirm` answer this only asks for confirmation.
pub async fn delete_point_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<PointId>,
    form: Option<Form<DeleteForm>>,
) -> Result<Response, PointError> {
    let confirm = form.and_then(|Form(form)| form.confirm);
    let confirmation = DeleteConfirmation::from_form(confirm.as_deref());

    let response = match delete_point(id, confirmation, actor(user), &state.deps).await? {
        DeleteOutcome::ConfirmationRequired(point) => Json(ConfirmDelete {
            confirm_required: true,
            point,
        })
        .into_response(),
        DeleteOutcome::Cancelled(id) => point_page(id).into_response(),
        DeleteOutcome::Deleted(_) => Redirect::to("/").into_response(),
    };
    Ok(response)
}

/// `POST /points/:id/send`
pub async fn send_point_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<PointId>,
) -> Result<Redirect, PointError> {
    send_point(id, actor(user), &state.deps).await?;
    Ok(point_page(id))
}
