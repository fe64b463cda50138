//! Login and logout routes.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domains::auth::{begin_login, complete_login, safe_next, SESSION_TTL_HOURS};
use crate::server::app::AppState;
use crate::server::error::json_error;
use crate::server::middleware::{clear_session_cookie_header, session_cookie_header, CurrentUser};
use crate::server::static_files::serve_embedded;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    openid: String,
    next: Option<String>,
}

/// Where to send the user after login; only local paths are honoured.
fn redirect_target(next: Option<&str>) -> &str {
    next.and_then(safe_next).unwrap_or("/")
}

/// `GET /login`
pub async fn login_page(
    user: Option<Extension<CurrentUser>>,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(redirect_target(query.next.as_deref())).into_response();
    }
    serve_embedded("login.html")
}

/// `POST /login` - start the OpenID handshake
pub async fn login_submit(
    Extension(state): Extension<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.openid.trim().is_empty() {
        return serve_embedded("login.html");
    }

    match begin_login(&form.openid, form.next.as_deref(), &state.base_url, &state.deps).await {
        Ok(provider_url) => Redirect::to(&provider_url).into_response(),
        Err(e) => {
            warn!(identifier = %form.openid, error = %e, "OpenID login could not start");
            json_error(StatusCode::BAD_REQUEST, format!("Login failed: {:#}", e))
        }
    }
}

/// `GET /login/callback` - the provider sends the browser back here
pub async fn login_callback(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match complete_login(&params, &state.deps).await {
        Ok(session) => {
            let target = redirect_target(params.get("next").map(String::as_str));
            (
                [(
                    header::SET_COOKIE,
                    session_cookie_header(&session.token, SESSION_TTL_HOURS * 3600),
                )],
                Redirect::to(target),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "OpenID login rejected");
            json_error(StatusCode::UNAUTHORIZED, format!("Login failed: {:#}", e))
        }
    }
}

/// `GET /logout`
pub async fn logout(user: Option<Extension<CurrentUser>>) -> Response {
    let Some(Extension(user)) = user else {
        return json_error(StatusCode::BAD_REQUEST, "Not logged in".to_string());
    };

    info!(identity = %user.identity, "User logged out");
    (
        [(header::SET_COOKIE, clear_session_cookie_header())],
        Redirect::to("/"),
    )
        .into_response()
}
