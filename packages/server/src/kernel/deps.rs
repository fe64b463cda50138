//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by the point
//! workflow and the HTTP layer. All external services use trait abstractions
//! to enable testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::common::auth::HasAuthContext;
use crate::common::PointId;
use crate::domains::auth::JwtService;
use crate::domains::points::AmenityCatalog;
use crate::kernel::{BaseIdentityProvider, BaseMapSubmitter, BasePointStore};

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub points: Arc<dyn BasePointStore>,
    pub map_submitter: Arc<dyn BaseMapSubmitter>,
    pub identity_provider: Arc<dyn BaseIdentityProvider>,
    /// JWT service for session tokens
    pub jwt_service: Arc<JwtService>,
    /// Category vocabulary, fixed at startup
    pub amenities: Arc<AmenityCatalog>,
    pub admin_identifiers: Vec<String>,
    /// Uploads currently running in this process
    pub sends_in_flight: Arc<InFlightSends>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        points: Arc<dyn BasePointStore>,
        map_submitter: Arc<dyn BaseMapSubmitter>,
        identity_provider: Arc<dyn BaseIdentityProvider>,
        jwt_service: Arc<JwtService>,
        amenities: Arc<AmenityCatalog>,
        admin_identifiers: Vec<String>,
    ) -> Self {
        Self {
            points,
            map_submitter,
            identity_provider,
            jwt_service,
            amenities,
            admin_identifiers,
            sends_in_flight: Arc::new(InFlightSends::default()),
        }
    }
}

/// Point ids with an OpenStreetMap upload in progress.
#[derive(Debug, Default)]
pub struct InFlightSends {
    ids: Mutex<HashSet<PointId>>,
}

impl InFlightSends {
    /// Claim `id` for the duration of an upload; `None` if it is already claimed.
    pub fn claim(&self, id: PointId) -> Option<SendClaim<'_>> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        ids.insert(id).then_some(SendClaim { sends: self, id })
    }

    pub fn is_claimed(&self, id: PointId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

/// Releases its point id when dropped.
pub struct SendClaim<'a> {
    sends: &'a InFlightSends,
    id: PointId,
}

impl Drop for SendClaim<'_> {
    fn drop(&mut self) {
        self.sends
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Implement HasAuthContext for ServerDeps to enable authorization checks
impl HasAuthContext for ServerDeps {
    fn admin_identifiers(&self) -> &[String] {
        &self.admin_identifiers
    }
}
