//! Login actions - entry points used by the /login routes.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::info;
use url::Url;

use crate::kernel::ServerDeps;

/// Identity and signed session token of a completed login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub identity: String,
    pub token: String,
}

/// Start the OpenID handshake; returns the provider URL to redirect to.
///
/// `next` survives the round trip as a query parameter of `return_to`.
pub async fn begin_login(
    identifier: &str,
    next: Option<&str>,
    base_url: &str,
    deps: &ServerDeps,
) -> Result<String> {
    let mut return_to = Url::parse(&format!("{}/login/callback", base_url.trim_end_matches('/')))
        .context("BASE_URL is not a valid URL")?;
    if let Some(next) = next.and_then(safe_next) {
        return_to.query_pairs_mut().append_pair("next", next);
    }

    info!(identifier = %identifier, "Starting OpenID login");
    deps.identity_provider
        .begin_login(identifier, return_to.as_str())
        .await
}

/// Verify the provider response and issue a session token.
pub async fn complete_login(
    params: &HashMap<String, String>,
    deps: &ServerDeps,
) -> Result<LoginSession> {
    let identity = deps.identity_provider.complete_login(params).await?;
    let token = deps.jwt_service.create_token(&identity)?;

    info!(identity = %identity, "User logged in");
    Ok(LoginSession { identity, token })
}

/// Accept only same-site absolute paths as redirect targets.
pub fn safe_next(next: &str) -> Option<&str> {
    let is_local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    is_local.then_some(next)
}
