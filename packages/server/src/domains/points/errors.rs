use thiserror::Error;

use crate::common::{AuthError, PointId};
use crate::domains::points::data::FormErrors;

/// Errors raised by the point store and point actions.
#[derive(Debug, Error)]
pub enum PointError {
    #[error("Invalid point: {0}")]
    Validation(FormErrors),

    #[error("Point {0} not found")]
    NotFound(PointId),

    #[error("Admin access required")]
    Forbidden,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Submission to OpenStreetMap failed: {0}")]
    Submission(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for PointError {
    fn from(_: AuthError) -> Self {
        // Anonymous callers of admin actions are denied the same way as
        // authenticated non-admins.
        Self::Forbidden
    }
}

impl From<sqlx::Error> for PointError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}
