//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::session_middleware;
use crate::server::routes::{
    add_poi_page, amenities_handler, delete_point_handler, edit_point_handler, health_handler,
    list_points_handler, login_callback, login_page, login_submit, logout, save_poi,
    send_point_handler, show_point_handler, thank_you_page,
};
use crate::server::static_files::static_asset;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    /// Public URL used to build OpenID return addresses
    pub base_url: String,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, base_url: String) -> Router {
    let jwt_service = deps.jwt_service.clone();

    let app_state = AppState {
        deps: Arc::new(deps),
        base_url,
    };

    Router::new()
        // Public listing
        .route("/", get(list_points_handler))
        .route("/points", get(list_points_handler))
        .route("/points/:id", get(show_point_handler))
        .route("/amenities", get(amenities_handler))
        // Submission
        .route("/addPOI", get(add_poi_page))
        .route("/save_poi", post(save_poi))
        .route("/thank_you", get(thank_you_page))
        // Admin actions
        .route("/points/:id/edit", post(edit_point_handler))
        .route("/points/:id/delete", post(delete_point_handler))
        .route("/points/:id/send", post(send_point_handler))
        // Sessions
        .route("/login", get(login_page).post(login_submit))
        .route("/login/callback", get(login_callback))
        .route("/logout", get(logout))
        .route("/health", get(health_handler))
        .route("/static/*path", get(static_asset))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            session_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}
