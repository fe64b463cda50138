use crate::domains::auth::JwtService;
use axum::{
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "osmpoint_session";

/// Logged-in user, resolved from the session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub identity: String,
}

/// Session middleware
///
/// Reads the session token from the `osmpoint_session` cookie, falling back to
/// an `Authorization: Bearer` header, and adds CurrentUser to request
/// extensions. Requests without a valid token continue anonymously.
pub async fn session_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_current_user(request.headers(), &jwt_service) {
        debug!(identity = %user.identity, "Authenticated session");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

fn extract_current_user(headers: &HeaderMap, jwt_service: &JwtService) -> Option<CurrentUser> {
    let token = session_cookie(headers).or_else(|| bearer_token(headers))?;
    let claims = jwt_service.verify_token(token).ok()?;

    Some(CurrentUser {
        identity: claims.sub,
    })
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// `Set-Cookie` value that stores a session token
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie_header() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
