//! In-process HTTP client for the axum router.
//!
//! Requests go through `tower::ServiceExt::oneshot`, backed by the in-memory
//! point store and mock external services.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use osmpoint_core::domains::auth::JwtService;
use osmpoint_core::kernel::test_dependencies::{TestDependencies, TEST_JWT_ISSUER, TEST_JWT_SECRET};
use osmpoint_core::server::build_app;
use osmpoint_core::server::middleware::SESSION_COOKIE;
use serde_json::Value;
use tower::ServiceExt;

pub const BASE_URL: &str = "http://points.test";
pub const ADMIN: &str = "https://admin.example.org/";
pub const USER: &str = "https://user1.example.org/";

/// A router wired to test dependencies, plus handles on its mocks.
pub struct TestApp {
    pub router: Router,
    pub deps: TestDependencies,
}

impl TestApp {
    /// App with `ADMIN` on the allow-list
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new().admin(ADMIN))
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        let router = build_app(deps.to_deps(), BASE_URL.to_string());
        Self { router, deps }
    }

    /// Session token for `identity`, signed like a real login
    pub fn session_for(&self, identity: &str) -> String {
        JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())
            .create_token(identity)
            .expect("Failed to create session token")
    }

    pub async fn get(&self, path: &str, identity: Option<&str>) -> TestResponse {
        let request = self
            .request("GET", path, identity)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// GET with a raw `Cookie` header
    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// POST `fields` as an urlencoded form
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        identity: Option<&str>,
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let request = self
            .request("POST", path, identity)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    fn request(
        &self,
        method: &str,
        path: &str,
        identity: Option<&str>,
    ) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match identity {
            Some(identity) => builder.header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE, self.session_for(identity)),
            ),
            None => builder,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        TestResponse::read(response).await
    }
}

/// Buffered response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn read(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION)
    }
}

/// Form fields for a valid cafe at (45.0, 7.0)
pub fn cafe_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Cafe X"),
        ("lat", "45.0"),
        ("lon", "7.0"),
        ("amenity", "cafe"),
    ]
}
