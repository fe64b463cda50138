//! HTTP responses for workflow errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domains::points::data::FormErrors;
use crate::domains::points::PointError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Validation failures carry the per-field flags so the form can be re-shown.
#[derive(Serialize)]
struct ValidationBody {
    error: String,
    #[serde(flatten)]
    fields: FormErrors,
}

pub(crate) fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

impl IntoResponse for PointError {
    fn into_response(self) -> Response {
        match self {
            PointError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationBody {
                    error: fields.to_string(),
                    fields,
                }),
            )
                .into_response(),
            PointError::Unauthenticated => Redirect::to("/login").into_response(),
            PointError::NotFound(_) => json_error(StatusCode::NOT_FOUND, self.to_string()),
            PointError::Forbidden => json_error(StatusCode::FORBIDDEN, self.to_string()),
            PointError::InvalidState(_) => json_error(StatusCode::BAD_REQUEST, self.to_string()),
            PointError::Submission(_) => json_error(StatusCode::BAD_GATEWAY, self.to_string()),
            PointError::Internal(e) => {
                error!(error = ?e, "Request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}
