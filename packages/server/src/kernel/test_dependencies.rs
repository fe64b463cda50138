// TestDependencies - mock implementations for testing
//
// Provides an in-memory point store and mock external services that can be
// injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::{BaseIdentityProvider, BaseMapSubmitter, BasePointStore, ServerDeps};
use crate::common::PointId;
use crate::domains::auth::JwtService;
use crate::domains::points::data::{NewPoint, PointFields};
use crate::domains::points::models::Point;
use crate::domains::points::{AmenityCatalog, PointError};

// =============================================================================
// In-memory Point Store
// =============================================================================

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    points: BTreeMap<PointId, Point>,
}

/// Point store backed by a map; ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryPointStore {
    state: RwLock<MemoryState>,
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BasePointStore for MemoryPointStore {
    async fn create(&self, point: NewPoint) -> Result<Point, PointError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = PointId::new(state.next_id);
        let now = chrono::Utc::now();

        let mut stored = Point {
            id,
            name: String::new(),
            url: None,
            latitude: Default::default(),
            longitude: Default::default(),
            amenity: String::new(),
            submitter: point.submitter,
            external_id: None,
            created_at: now,
            updated_at: now,
        };
        point.fields.apply_to(&mut stored);

        state.points.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: PointId) -> Result<Point, PointError> {
        self.state
            .read()
            .await
            .points
            .get(&id)
            .cloned()
            .ok_or(PointError::NotFound(id))
    }

    async fn update(&self, id: PointId, fields: &PointFields) -> Result<Point, PointError> {
        let mut state = self.state.write().await;
        let point = state.points.get_mut(&id).ok_or(PointError::NotFound(id))?;
        fields.apply_to(point);
        point.updated_at = chrono::Utc::now();
        Ok(point.clone())
    }

    async fn delete(&self, id: PointId) -> Result<(), PointError> {
        self.state
            .write()
            .await
            .points
            .remove(&id)
            .map(|_| ())
            .ok_or(PointError::NotFound(id))
    }

    async fn list_by_submission_status(&self, submitted: bool) -> Result<Vec<Point>, PointError> {
        Ok(self
            .state
            .read()
            .await
            .points
            .values()
            .filter(|point| point.is_sent() == submitted)
            .cloned()
            .collect())
    }

    async fn mark_submitted(&self, id: PointId, external_id: &str) -> Result<Point, PointError> {
        let mut state = self.state.write().await;
        let point = state.points.get_mut(&id).ok_or(PointError::NotFound(id))?;
        if let Some(existing) = &point.external_id {
            return Err(PointError::InvalidState(format!(
                "point {} was already submitted as {}",
                id, existing
            )));
        }
        point.external_id = Some(external_id.to_string());
        point.updated_at = chrono::Utc::now();
        Ok(point.clone())
    }

    async fn count(&self) -> Result<u64, PointError> {
        Ok(self.state.read().await.points.len() as u64)
    }
}

// =============================================================================
// Mock Map Submitter
// =============================================================================

/// Arguments captured from a submit call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCall {
    pub point_id: PointId,
    pub admin: String,
}

/// Returns queued responses in order, then `osm:{point id}` once the queue is empty.
pub struct MockMapSubmitter {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<SubmitCall>>,
    delay: Option<Duration>,
    concurrent_submission: Option<(Arc<dyn BasePointStore>, String)>,
}

impl MockMapSubmitter {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            concurrent_submission: None,
        }
    }

    /// Sleep before answering each submit call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Mark the point submitted as `external_id` in `points` during each
    /// submit call, as another server would
    pub fn with_concurrent_submission(
        mut self,
        points: Arc<dyn BasePointStore>,
        external_id: &str,
    ) -> Self {
        self.concurrent_submission = Some((points, external_id.to_string()));
        self
    }

    /// Queue a successful submission returning `external_id`
    pub fn with_external_id(self, external_id: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(external_id.to_string()));
        self
    }

    /// Queue a failed submission
    pub fn with_failure(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Get all submit calls made so far
    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockMapSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMapSubmitter for MockMapSubmitter {
    async fn submit(&self, point: &Point, admin: &str) -> Result<String> {
        self.calls.lock().unwrap().push(SubmitCall {
            point_id: point.id,
            admin: admin.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((points, external_id)) = &self.concurrent_submission {
            points.mark_submitted(point.id, external_id).await?;
        }

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(external_id)) => Ok(external_id),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(format!("osm:{}", point.id)),
        }
    }
}

// =============================================================================
// Mock Identity Provider
// =============================================================================

pub const MOCK_PROVIDER_URL: &str = "https://id.example.org/openid";

/// Accepts any `id_res` response and trusts its `openid.claimed_id`.
pub struct MockIdentityProvider {
    reject_all: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self { reject_all: false }
    }

    /// Fail every login attempt
    pub fn rejecting() -> Self {
        Self { reject_all: true }
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseIdentityProvider for MockIdentityProvider {
    async fn begin_login(&self, identifier: &str, return_to: &str) -> Result<String> {
        if self.reject_all {
            anyhow::bail!("Unknown OpenID identifier {}", identifier);
        }
        let url = Url::parse_with_params(
            MOCK_PROVIDER_URL,
            &[("openid.claimed_id", identifier), ("openid.return_to", return_to)],
        )?;
        Ok(url.into())
    }

    async fn complete_login(&self, params: &HashMap<String, String>) -> Result<String> {
        if self.reject_all {
            anyhow::bail!("OpenID provider rejected the assertion");
        }
        if params.get("openid.mode").map(String::as_str) != Some("id_res") {
            anyhow::bail!("Login was cancelled");
        }
        params
            .get("openid.claimed_id")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("OpenID response carries no identity"))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test-session-secret";
pub const TEST_JWT_ISSUER: &str = "osmpoint-test";

pub struct TestDependencies {
    pub points: Arc<MemoryPointStore>,
    pub map_submitter: Arc<MockMapSubmitter>,
    pub identity_provider: Arc<MockIdentityProvider>,
    pub admin_identifiers: Vec<String>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            points: Arc::new(MemoryPointStore::new()),
            map_submitter: Arc::new(MockMapSubmitter::new()),
            identity_provider: Arc::new(MockIdentityProvider::new()),
            admin_identifiers: Vec::new(),
        }
    }

    /// Add an identity to the admin allow-list
    pub fn admin(mut self, identity: &str) -> Self {
        self.admin_identifiers.push(identity.to_string());
        self
    }

    /// Set a mock map submitter
    pub fn mock_submitter(mut self, submitter: MockMapSubmitter) -> Self {
        self.map_submitter = Arc::new(submitter);
        self
    }

    /// Set a mock identity provider
    pub fn mock_identity(mut self, provider: MockIdentityProvider) -> Self {
        self.identity_provider = Arc::new(provider);
        self
    }

    /// Build ServerDeps sharing this instance's mocks
    pub fn to_deps(&self) -> ServerDeps {
        let amenities =
            AmenityCatalog::bundled().expect("bundled amenity list must parse in tests");
        ServerDeps::new(
            self.points.clone(),
            self.map_submitter.clone(),
            self.identity_provider.clone(),
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            Arc::new(amenities),
            self.admin_identifiers.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
